//! Platform statistics for administrators

use axum::{extract::State, Json};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::server::SharedState;
use crate::error::Result;
use crate::store::{Collection, Document, Filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_sale: f64,
    pub booking_count: u64,
    pub user_count: u64,
    pub room_count: u64,
    /// Header row followed by `[day, sales]` rows
    pub chart_data: Vec<Value>,
}

fn booking_price(booking: &Document) -> f64 {
    match booking.get("price") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Day of month a booking was made, from an RFC 3339 / `YYYY-MM-DD`
/// string or epoch milliseconds
fn booking_day(booking: &Document) -> Option<u32> {
    match booking.get("date")? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.day())
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.day()))
            .ok(),
        Value::Number(n) => Utc
            .timestamp_millis_opt(n.as_i64()?)
            .single()
            .map(|dt| dt.day()),
        _ => None,
    }
}

/// Sales summed per day of month
pub fn sales_by_day(bookings: &[Document]) -> BTreeMap<u32, f64> {
    let mut series = BTreeMap::new();
    for booking in bookings {
        if let Some(day) = booking_day(booking) {
            *series.entry(day).or_insert(0.0) += booking_price(booking);
        }
    }
    series
}

pub fn summarize(bookings: &[Document], user_count: u64, room_count: u64) -> AdminStats {
    let total_sale = bookings.iter().map(booking_price).sum();

    let mut chart_data = vec![json!(["Day", "Sales"])];
    chart_data.extend(
        sales_by_day(bookings)
            .into_iter()
            .map(|(day, sales)| json!([day, sales])),
    );

    AdminStats {
        total_sale,
        booking_count: bookings.len() as u64,
        user_count,
        room_count,
        chart_data,
    }
}

pub async fn admin_stat(State(state): State<SharedState>) -> Result<Json<AdminStats>> {
    let bookings = state.store.find(Collection::Bookings, &Filter::all()).await?;
    let user_count = state.store.count(Collection::Users).await?;
    let room_count = state.store.count(Collection::Rooms).await?;

    Ok(Json(summarize(&bookings, user_count, room_count)))
}
