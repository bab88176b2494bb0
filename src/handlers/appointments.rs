use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::handlers::CurrentUser;
use crate::models::Notice;
use crate::services::appointments::{self, AppointmentCard};
use crate::state::AppState;

// GET /api/appointments
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<AppointmentCard>>, AppError> {
    let cards =
        appointments::list_appointments(state.backend.as_ref(), &user.id, Utc::now(), state.offset)
            .await?;
    Ok(Json(cards))
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub notice: Notice,
    /// The list as it reads after the cancellation; `None` if it could not be reloaded,
    /// in which case the client keeps its own copy.
    pub appointments: Option<Vec<AppointmentCard>>,
}

// POST /api/appointments/:id/cancel
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, AppError> {
    let now = Utc::now();
    let backend = state.backend.as_ref();

    let notice = appointments::cancel_appointment(backend, &user.id, &id, now).await?;
    // already cancelled at this point
    let refreshed = match appointments::list_appointments(backend, &user.id, now, state.offset)
        .await
    {
        Ok(cards) => Some(cards),
        Err(e) => {
            tracing::warn!(appointment_id = %id, error = %e, "could not reload appointments after cancel");
            None
        }
    };

    Ok(Json(CancelResponse {
        notice,
        appointments: refreshed,
    }))
}
