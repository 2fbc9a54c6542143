//! HTTP API server

pub mod bookings;
pub mod payments;
pub mod rooms;
pub mod routes;
pub mod server;
pub mod stats;
pub mod users;

pub use server::*;
