use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::errors::AppError;
use crate::handlers::CurrentUser;
use crate::services::dashboard::{load_dashboard, DashboardView};
use crate::state::AppState;

// GET /api/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<DashboardView>, AppError> {
    let view = load_dashboard(
        state.backend.as_ref(),
        &user.id,
        user.email.as_deref(),
        Utc::now(),
        state.offset,
    )
    .await?;
    Ok(Json(view))
}
