//! CLI interface for GrandStay

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};

use crate::auth::UserRole;

#[derive(Parser)]
#[command(name = "grandstay")]
#[command(version)]
#[command(about = "Booking platform backend for rooms, bookings and payments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new grandstay.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect and manage user accounts (stop the server first)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List all users
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Set a user's role, creating the account if needed
    SetRole {
        /// Email of the account
        email: String,

        /// New role
        #[arg(value_parser = parse_role)]
        role: UserRole,
    },
}

fn parse_role(value: &str) -> Result<UserRole, String> {
    value.parse()
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
