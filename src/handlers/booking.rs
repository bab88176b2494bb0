use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::CurrentUser;
use crate::services::booking::{self, Booked, BookingForm, BookingRequest};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BookingFormQuery {
    pub service_id: Option<String>,
}

// GET /api/booking
pub async fn booking_form(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Query(query): Query<BookingFormQuery>,
) -> Result<Json<BookingForm>, AppError> {
    let form = booking::booking_form(
        state.backend.as_ref(),
        query.service_id.as_deref(),
        Utc::now(),
        state.offset,
    )
    .await?;
    Ok(Json(form))
}

// GET /api/booking/slots
pub async fn time_slots() -> Json<Vec<String>> {
    Json(booking::slot_labels())
}

// POST /api/appointments
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booked>), AppError> {
    let Json(request) = payload?;
    let booked = booking::book(
        state.backend.as_ref(),
        &user.id,
        request,
        Utc::now(),
        state.offset,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(booked)))
}
