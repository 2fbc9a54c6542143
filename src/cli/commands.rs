//! CLI command implementations

use anyhow::Result;
use serde_json::Value;
use std::fs;

use crate::auth::UserRole;
use crate::cli::{error, info, print_user_table, success, warn, OutputFormat, UsersAction};
use crate::config::{self, loader::CONFIG_FILENAME};
use crate::store::{self, Collection, Document, Filter, SharedStore};

/// Initialize a new grandstay.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set ACCESS_TOKEN_SECRET and PAYMENT_SECRET_KEY, then run 'grandstay serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = config::load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Manage user accounts directly in the store
pub async fn users(action: UsersAction) -> Result<()> {
    let config = config::load_config()?;
    let store = store::open(&config.database)?;

    let outcome = match action {
        UsersAction::List { format } => list_users(&store, format).await,
        UsersAction::SetRole { email, role } => set_role(&store, &email, role).await,
    };

    store.close().await?;
    outcome
}

async fn list_users(store: &SharedStore, format: OutputFormat) -> Result<()> {
    let users = store.find(Collection::Users, &Filter::all()).await?;

    match format {
        OutputFormat::Table => print_user_table(&users),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users)?),
    }

    Ok(())
}

async fn set_role(store: &SharedStore, email: &str, role: UserRole) -> Result<()> {
    let mut set = Document::new();
    set.insert("role".to_string(), Value::from(role.as_str()));
    set.insert(
        "timestamp".to_string(),
        Value::from(chrono::Utc::now().timestamp_millis()),
    );

    match store
        .update_one(Collection::Users, &Filter::eq("email", email), set, true)
        .await
    {
        Ok(result) if result.upserted_count > 0 => {
            success(&format!("Created {} as {}", email, role));
            Ok(())
        }
        Ok(_) => {
            success(&format!("Set role of {} to {}", email, role));
            Ok(())
        }
        Err(e) => {
            error(&format!("Failed to set role: {}", e));
            Err(e.into())
        }
    }
}
