//! GrandStay - booking platform backend
//!
//! This is the library interface for GrandStay: the REST API, the session
//! and role guards, and the document store and payment processor
//! interfaces it is built on.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod payment;
pub mod store;

pub use config::Config;
pub use error::Error;
