use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub engine: String,
    pub model: String,
    pub output_dir: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_status = if tokio::fs::metadata(&state.config.model_path).await.is_ok() {
        "available"
    } else {
        "missing"
    };

    let output_status = if state.results.is_available().await {
        "available"
    } else {
        "unavailable"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        engine: state.engine.name().to_string(),
        model: model_status.to_string(),
        output_dir: output_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
