//! User account handlers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::server::SharedState;
use crate::error::Result;
use crate::store::{Collection, Document, Filter, UpdateResult};

/// Status that lets an existing account be overwritten
pub const REQUESTED_STATUS: &str = "Requested";

fn by_email(email: &str) -> Filter {
    Filter::eq("email", email)
}

/// The path email is the account key and always wins over the payload's
fn pin_email(user: &mut Document, email: &str) {
    user.insert("email".to_string(), Value::from(email));
}

fn now_millis() -> Value {
    Value::from(chrono::Utc::now().timestamp_millis())
}

/// Save or modify a user.
///
/// A new email is created with a `timestamp`. An existing one is only
/// overwritten when the payload's status is `Requested`; otherwise the
/// stored record is returned untouched.
pub async fn save_user(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(mut user): Json<Document>,
) -> Result<Response> {
    let filter = by_email(&email);
    pin_email(&mut user, &email);

    if let Some(existing) = state.store.find_one(Collection::Users, &filter).await? {
        let requested = user.get("status").and_then(|v| v.as_str()) == Some(REQUESTED_STATUS);
        if !requested {
            tracing::debug!("User {} already exists, leaving it unchanged", email);
            return Ok(Json(existing).into_response());
        }

        tracing::info!("User {} requested a role change", email);
        let result = state
            .store
            .update_one(Collection::Users, &filter, user, true)
            .await?;
        return Ok(Json(result).into_response());
    }

    user.insert("timestamp".to_string(), now_millis());
    let result = state
        .store
        .update_one(Collection::Users, &filter, user, true)
        .await?;
    tracing::info!("Created user {}", email);
    Ok(Json(result).into_response())
}

/// Fetch one user, `null` when unknown
pub async fn get_user(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Option<Document>>> {
    let user = state
        .store
        .find_one(Collection::Users, &by_email(&email))
        .await?;
    Ok(Json(user))
}

pub async fn list_users(State(state): State<SharedState>) -> Result<Json<Vec<Document>>> {
    let users = state.store.find(Collection::Users, &Filter::all()).await?;
    Ok(Json(users))
}

/// Unconditional upsert, used for role changes
pub async fn update_user(
    State(state): State<SharedState>,
    Path(email): Path<String>,
    Json(mut user): Json<Document>,
) -> Result<Json<UpdateResult>> {
    pin_email(&mut user, &email);
    user.insert("timestamp".to_string(), now_millis());

    let result = state
        .store
        .update_one(Collection::Users, &by_email(&email), user, true)
        .await?;
    tracing::info!("Updated user {}", email);
    Ok(Json(result))
}
