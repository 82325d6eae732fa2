use axum::{extract::State, routing::get, Json, Router};

use crate::config::formats;
use crate::models::HealthResponse;

#[derive(Clone)]
pub struct HealthState {
    pub max_file_size_mb: u64,
    pub segmenter_configured: bool,
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

/// Health check dell'API
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API funzionante", body = HealthResponse),
    ),
    tag = "Sistema"
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        segmenter_configured: state.segmenter_configured,
        supported_formats: formats::upload_format_names(),
        max_file_size_mb: state.max_file_size_mb,
    })
}
