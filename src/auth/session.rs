//! Session cookie transport
//!
//! The session token travels in an `HttpOnly` cookie. `Secure` and
//! `SameSite` are chosen together from the deployment environment:
//! browsers drop `SameSite=None` cookies that are not `Secure`, and a
//! cookie is only cleared when the clearing header repeats the attributes
//! it was set with.

use axum::http::{header, HeaderMap};
use std::fmt;

use crate::config::Environment;

/// Cross-site cookie policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// The `Secure`/`SameSite` pair. Only constructible as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
}

impl CookiePolicy {
    pub fn for_environment(environment: Environment) -> Self {
        if environment.is_production() {
            Self {
                secure: true,
                same_site: SameSite::None,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Strict,
            }
        }
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn same_site(&self) -> SameSite {
        self.same_site
    }
}

/// Writes and reads the session cookie
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    policy: CookiePolicy,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            policy: CookiePolicy::for_environment(environment),
        }
    }

    /// `Set-Cookie` value carrying a freshly issued token
    pub fn issue(&self, token: &str) -> String {
        format!("{}={}; {}", self.name, token, self.attributes())
    }

    /// `Set-Cookie` value that removes the session cookie
    pub fn clear(&self) -> String {
        format!(
            "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
            self.name,
            self.attributes()
        )
    }

    /// Token carried by the request's `Cookie` headers, if any
    pub fn read<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|cookie| cookie.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn attributes(&self) -> String {
        let mut attributes = String::from("Path=/; HttpOnly");
        if self.policy.secure {
            attributes.push_str("; Secure");
        }
        attributes.push_str(&format!("; SameSite={}", self.policy.same_site));
        attributes
    }
}
