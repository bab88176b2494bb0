use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::services::catalog::{self, ServiceCard};
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceCard>>, AppError> {
    let cards = catalog::load_catalog(state.backend.as_ref()).await?;
    Ok(Json(cards))
}
