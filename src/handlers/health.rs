use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::backend::{Query, Table};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend_ok: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let probe = Query::table(Table::Services)
        .columns(&["id"])
        .eq("id", "health-probe");
    let backend_ok = match state.backend.select(&probe).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "backend health probe failed");
            false
        }
    };

    Json(HealthResponse {
        status: if backend_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        backend_ok,
    })
}
