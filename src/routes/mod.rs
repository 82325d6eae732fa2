pub mod health;
pub mod jobs;
pub mod process;
pub mod upload;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::db::DbPool;
use crate::middleware::cors::cors_middleware;
use crate::openapi::ApiDoc;
use crate::services::{FileStorage, JobProcessor, SharedSegmenter};

/// Router delle API con i limiti di upload applicati
pub fn create_router(
    db: DbPool,
    storage: FileStorage,
    segmenter: SharedSegmenter,
    config: &Config,
) -> Router {
    let processor = JobProcessor::new(
        db.clone(),
        storage.clone(),
        segmenter.clone(),
        config.processing_max_dimension,
    );

    Router::new()
        .merge(health::router(health::HealthState {
            max_file_size_mb: config.max_file_size_mb,
            segmenter_configured: config.segmenter_url.is_some(),
        }))
        .merge(process::router(process::ProcessState {
            segmenter,
            model: config.default_model,
            max_file_size_mb: config.max_file_size_mb,
            working_max_dimension: config.inline_max_dimension,
        }))
        .merge(jobs::router(jobs::JobsState {
            db,
            storage,
            processor,
            default_model: config.default_model,
            max_file_size_mb: config.max_file_size_mb,
        }))
        .layer(DefaultBodyLimit::max(config.max_body_bytes()))
}

/// Applicazione completa: Swagger UI, tracing delle richieste e CORS esterno a tutto
pub fn build_app(api_routes: Router) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(cors_middleware))
}
