//! Payment intent handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::server::SharedState;
use crate::error::Result;
use crate::payment::minor_units;
use crate::store::Document;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub client_secret: String,
}

/// Create a payment intent for `price` (major units). A missing or
/// unusable price answers with an empty body and creates nothing.
pub async fn create_payment_intent(
    State(state): State<SharedState>,
    Json(body): Json<Document>,
) -> Result<Response> {
    let Some(amount) = minor_units(body.get("price")) else {
        tracing::debug!("Ignoring payment intent request without a usable price");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let intent = state.payments.create_payment_intent(amount).await?;
    Ok(Json(ClientSecretResponse {
        client_secret: intent.client_secret,
    })
    .into_response())
}
