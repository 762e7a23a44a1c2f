pub mod api;
pub mod config;
pub mod engine;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::DetectorConfig;
use crate::engine::DetectionEngine;
use crate::services::detection::DetectionService;
use crate::services::results::ResultStore;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::detect::detect_image,
        api::handlers::results::download_result,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::detect::DetectResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "detect", description = "Image detection endpoints"),
        (name = "results", description = "Processed result retrieval"),
        (name = "system", description = "Service health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn DetectionEngine>,
    pub detection: Arc<DetectionService>,
    pub results: Arc<ResultStore>,
    pub config: DetectorConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/detect",
            post(api::handlers::detect::detect_image).layer(axum::extract::DefaultBodyLimit::max(
                state.config.max_upload_size + 10 * 1024 * 1024, // Add 10MB buffer for multipart overhead
            )),
        )
        .route(
            "/results/:id",
            get(api::handlers::results::download_result),
        )
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
