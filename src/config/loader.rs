//! Reading grandstay.toml with `${VAR}` substitution

use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};

use super::Config;

pub const CONFIG_FILENAME: &str = "grandstay.toml";

/// Load configuration from grandstay.toml, falling back to the built-in
/// template when no file exists
pub fn load_config() -> Result<Config> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Failed to read .env file: {}", e);
        }
    }

    match find_config_file() {
        Ok(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            load_config_from_path(&path)
        }
        Err(Error::ConfigNotFound) => {
            tracing::debug!("No {} found, using environment defaults", CONFIG_FILENAME);
            parse_config(default_config_content())
        }
        Err(e) => Err(e),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ConfigNotFound),
        Err(e) => Err(e.into()),
    }
}

/// Interpolate and parse TOML configuration text
pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(&interpolate_env_vars(content))?)
}

/// Nearest grandstay.toml in the working directory or one of its parents
fn find_config_file() -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
        .ok_or(Error::ConfigNotFound)
}

/// `${NAME}` or `${NAME:-fallback}`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("placeholder pattern compiles")
});

/// Substitute environment variables into configuration text. Unset
/// variables take their fallback, or the empty string without one.
fn interpolate_env_vars(content: &str) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            let fallback = caps.get(2).map_or("", |m| m.as_str());
            env::var(&caps[1]).unwrap_or_else(|_| fallback.to_owned())
        })
        .into_owned()
}

/// Template written by `grandstay init`, also used when no file exists
pub fn default_config_content() -> &'static str {
    r#"# GrandStay Configuration

[server]
host = "${HOST:-0.0.0.0}"
port = ${PORT:-8000}
# "production" switches the session cookie to Secure + SameSite=None
environment = "${APP_ENV:-development}"
allowed_origins = ["http://localhost:5173", "http://localhost:5174"]

[auth]
secret = "${ACCESS_TOKEN_SECRET:-grandstay-secret-key-change-in-production}"
cookie_name = "token"
token_ttl_days = 365

[database]
# Directory of the embedded store, or ":memory:" for an ephemeral one
path = "${DB_PATH:-./data/grandstay}"
namespace = "GrandStayDB"

[payment]
secret_key = "${PAYMENT_SECRET_KEY:-}"
api_base = "https://api.stripe.com"
currency = "usd"
"#
}
