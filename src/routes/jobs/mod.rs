//! Job routes module
//!
//! This module provides HTTP endpoints for creating and inspecting
//! background-removal jobs.

mod crud;

use axum::{routing::get, Router};

use crate::db::DbPool;
use crate::models::SegmentationModel;
use crate::services::{FileStorage, JobProcessor};

// Re-export public items (including utoipa path types)
pub use crud::*;

/// Shared state for job routes
#[derive(Clone)]
pub struct JobsState {
    pub db: DbPool,
    pub storage: FileStorage,
    pub processor: JobProcessor,
    pub default_model: SegmentationModel,
    pub max_file_size_mb: u64,
}

/// Create the router for job endpoints
pub fn router(state: JobsState) -> Router {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route("/api/jobs/:id", get(get_job_status))
        .route("/api/jobs/:id/result", get(download_job_result))
        .with_state(state)
}
