use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::models::{Booking, CancelActor};
use crate::services::ledger::{self, CancelOutcome};
use crate::services::availability;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    id: i64,
    first_name: String,
    last_name: String,
    phone: String,
    date: String,
    time: String,
    service: String,
    status: String,
    created_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            first_name: b.first_name,
            last_name: b.last_name,
            phone: b.phone,
            date: b.date.format(queries::DATE_FORMAT).to_string(),
            time: b.time,
            service: b.service,
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format(queries::TIMESTAMP_FORMAT).to_string(),
        }
    }
}

// GET /api/bookings/active
pub async fn list_active(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = {
        let db = state.conn()?;
        ledger::list_active(&db)?
    };
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

// POST /api/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub service: String,
}

#[derive(Serialize)]
pub struct CreateBookingResponse {
    id: i64,
    message: &'static str,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, AppError> {
    let new_booking = ledger::validate_new_booking(
        &body.first_name,
        &body.last_name,
        &body.phone,
        &body.date,
        &body.time,
        &body.service,
    )?;

    let booking = {
        let mut db = state.conn()?;
        ledger::create(&mut db, &new_booking)?
    };

    Ok(Json(CreateBookingResponse {
        id: booking.id,
        message: "booking created",
    }))
}

/// Response body shared by the customer and admin cancel routes.
pub fn cancel_message(outcome: CancelOutcome) -> Json<serde_json::Value> {
    let message = match outcome {
        CancelOutcome::Cancelled(_) => "booking cancelled",
        CancelOutcome::AlreadyCancelled(_) => "booking was already cancelled",
    };
    Json(serde_json::json!({ "message": message }))
}

// PUT /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = {
        let db = state.conn()?;
        ledger::cancel(&db, id, CancelActor::Customer)?
    };
    Ok(cancel_message(outcome))
}

// GET /api/available-slots/:date
pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    ApiPath(date): ApiPath<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let date = ledger::parse_date(&date)?;
    let slots = {
        let db = state.conn()?;
        availability::free_slots_on(&db, &date)?
    };
    Ok(Json(slots))
}
