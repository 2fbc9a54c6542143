//! Configuration management for GrandStay

pub mod loader;
mod schema;

pub use loader::{load_config, parse_config};
pub use schema::*;
