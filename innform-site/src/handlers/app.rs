use crate::services::metrics::get_metrics;
use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "innform-site",
        "version": env!("CARGO_PKG_VERSION"),
        "eduplan_mode": state.backend.mode().to_string()
    }))
}

pub async fn metrics() -> Result<String, AppError> {
    get_metrics().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("metrics recorder not initialized"))
    })
}
