use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::handlers::CurrentUser;
use crate::models::ProfileUpdate;
use crate::services::profile::{load_profile, save_profile, ProfileSaved, ProfileView};
use crate::state::AppState;

// GET /api/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ProfileView>, AppError> {
    let view = load_profile(state.backend.as_ref(), &user.id, user.email.as_deref()).await?;
    Ok(Json(view))
}

// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileSaved>, AppError> {
    let Json(update) = payload?;
    let saved = save_profile(state.backend.as_ref(), &user.id, update).await?;
    Ok(Json(saved))
}
