//! Booking handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::server::SharedState;
use crate::error::Result;
use crate::store::{Collection, Document, Filter, InsertOneResult, ID_FIELD};

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

pub async fn create_booking(
    State(state): State<SharedState>,
    Json(mut booking): Json<Document>,
) -> Result<Json<InsertOneResult>> {
    booking.remove(ID_FIELD);
    let result = state.store.insert_one(Collection::Bookings, booking).await?;
    tracing::info!("Saved booking {}", result.inserted_id);
    Ok(Json(result))
}

/// Bookings made by a guest; empty without an email
pub async fn guest_bookings(
    State(state): State<SharedState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };
    let bookings = state
        .store
        .find(Collection::Bookings, &Filter::eq("guest.email", email))
        .await?;
    Ok(Json(bookings))
}

/// Bookings of a host's rooms; empty without an email
pub async fn host_bookings(
    State(state): State<SharedState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Document>>> {
    let Some(email) = query.email() else {
        return Ok(Json(Vec::new()));
    };
    let bookings = state
        .store
        .find(Collection::Bookings, &Filter::eq("host", email))
        .await?;
    Ok(Json(bookings))
}
