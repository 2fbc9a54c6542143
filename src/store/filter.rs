//! Equality filters and field updates over JSON documents

use serde_json::Value;

use super::{Document, ID_FIELD};

/// Conjunction of `path == value` clauses. Paths may be dotted
/// (`host.email`) to reach into embedded objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(path, value)
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, id.into())
    }

    pub fn and(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((path.into(), value.into()));
        self
    }

    /// The id this filter pins, when it is a plain `_id` lookup
    pub fn id(&self) -> Option<&str> {
        match self.clauses.as_slice() {
            [(path, Value::String(id))] if path == ID_FIELD => Some(id),
            _ => None,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(path, expected)| lookup(doc, path) == Some(expected))
    }

    /// Document an upsert starts from when nothing matched
    pub fn seed(&self) -> Document {
        let mut doc = Document::new();
        for (path, value) in &self.clauses {
            set_path(&mut doc, path, value.clone());
        }
        doc
    }
}

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Set a dotted path, creating intermediate objects. Returns whether the
/// document changed.
pub fn set_path(doc: &mut Document, path: &str, value: Value) -> bool {
    match path.split_once('.') {
        None => {
            if doc.get(path) == Some(&value) {
                return false;
            }
            doc.insert(path.to_string(), value);
            true
        }
        Some((head, rest)) => {
            let entry = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            if !entry.is_object() {
                *entry = Value::Object(Document::new());
            }
            match entry.as_object_mut() {
                Some(inner) => set_path(inner, rest, value),
                None => false,
            }
        }
    }
}

/// Apply a `$set`-style update. The `_id` field is never rewritten.
pub fn apply_set(doc: &mut Document, set: Document) -> bool {
    let mut modified = false;
    for (path, value) in set {
        if path == ID_FIELD {
            continue;
        }
        modified |= set_path(doc, &path, value);
    }
    modified
}
