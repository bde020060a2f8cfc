use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};

use crate::errors::AppError;
use crate::handlers::bookings::{cancel_message, BookingResponse};
use crate::handlers::extract::ApiPath;
use crate::models::{AdminIdentity, CancelActor};
use crate::services::ledger;
use crate::state::AppState;

// GET /api/admin/bookings
pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = {
        let db = state.conn()?;
        ledger::list_all(&db)?
    };
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

// PUT /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = {
        let db = state.conn()?;
        ledger::cancel(&db, id, CancelActor::Admin)?
    };
    tracing::info!(booking_id = id, admin = %admin.username, "admin cancel request handled");
    Ok(cancel_message(outcome))
}
