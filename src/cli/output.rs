//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::UserRole;
use crate::store::Document;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

fn role_color(role: UserRole) -> Color {
    match role {
        UserRole::Admin => Color::Red,
        UserRole::Host => Color::Green,
        UserRole::Guest => Color::White,
    }
}

fn text_field<'a>(doc: &'a Document, field: &str) -> &'a str {
    doc.get(field).and_then(|v| v.as_str()).unwrap_or("-")
}

fn format_timestamp(doc: &Document) -> String {
    doc.get("timestamp")
        .and_then(|v| v.as_i64())
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Print a table of users
pub fn print_user_table(users: &[Document]) {
    if users.is_empty() {
        info("No users found. Accounts are created when clients sign in.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Email").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Role").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Created").fg(Color::Cyan),
        ]);

    for user in users {
        let role = UserRole::of(user);
        table.add_row(vec![
            Cell::new(text_field(user, "email")),
            Cell::new(text_field(user, "name")),
            Cell::new(role).fg(role_color(role)),
            Cell::new(text_field(user, "status")),
            Cell::new(format_timestamp(user)),
        ]);
    }

    println!("{table}");
}
