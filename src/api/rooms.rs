//! Room listing handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::server::SharedState;
use crate::error::Result;
use crate::store::{parse_id, Collection, Document, Filter, InsertOneResult, UpdateResult, ID_FIELD};

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Value,
}

pub async fn list_rooms(State(state): State<SharedState>) -> Result<Json<Vec<Document>>> {
    let rooms = state.store.find(Collection::Rooms, &Filter::all()).await?;
    Ok(Json(rooms))
}

/// Rooms owned by a host
pub async fn host_rooms(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Document>>> {
    let rooms = state
        .store
        .find(Collection::Rooms, &Filter::eq("host.email", email))
        .await?;
    Ok(Json(rooms))
}

pub async fn get_room(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>> {
    let id = parse_id(&id)?;
    let room = state
        .store
        .find_one(Collection::Rooms, &Filter::by_id(id))
        .await?;
    Ok(Json(room))
}

pub async fn create_room(
    State(state): State<SharedState>,
    Json(mut room): Json<Document>,
) -> Result<Json<InsertOneResult>> {
    room.remove(ID_FIELD);
    let result = state.store.insert_one(Collection::Rooms, room).await?;
    tracing::info!("Added room {}", result.inserted_id);
    Ok(Json(result))
}

/// Set a room's `booked` flag. Nothing ties this to the bookings
/// collection; the client flips it after booking.
pub async fn set_room_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<UpdateResult>> {
    let id = parse_id(&id)?;
    let mut set = Document::new();
    set.insert("booked".to_string(), update.status);

    let result = state
        .store
        .update_one(Collection::Rooms, &Filter::by_id(id), set, false)
        .await?;
    Ok(Json(result))
}
