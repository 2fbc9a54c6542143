//! Service banner and session handlers

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::server::SharedState;
use crate::auth::Identity;
use crate::error::Result;

pub const BANNER: &str = "Hello from GrandStay Server..";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub success: bool,
}

pub async fn root() -> &'static str {
    BANNER
}

/// Issue a session token for the posted identity and set it as a cookie
pub async fn issue_session(
    State(state): State<SharedState>,
    Json(identity): Json<Identity>,
) -> Result<impl IntoResponse> {
    let set_cookie = state.auth.start_session(&identity)?;
    tracing::info!("Issued session for {}", identity.email);

    Ok((
        [(header::SET_COOKIE, set_cookie)],
        Json(SessionResponse { success: true }),
    ))
}

/// Clear the session cookie
pub async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    tracing::info!("Logout successful");
    (
        [(header::SET_COOKIE, state.auth.end_session())],
        Json(SessionResponse { success: true }),
    )
}
