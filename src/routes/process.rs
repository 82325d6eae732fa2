//! Endpoint inline: upload, validazione, rimozione sfondo, risultato base64

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::handlers::inline::process_inline;
use crate::models::{BackgroundSpec, ErrorResponse, ProcessResponse, SegmentationModel};
use crate::services::SharedSegmenter;
use crate::utils::{to_data_uri, validate_upload};

use super::upload::read_upload_form;

/// Shared state for the inline endpoint
#[derive(Clone)]
pub struct ProcessState {
    pub segmenter: SharedSegmenter,
    pub model: SegmentationModel,
    pub max_file_size_mb: u64,
    pub working_max_dimension: u32,
}

pub fn router(state: ProcessState) -> Router {
    Router::new()
        .route("/api/process", post(process_image).fallback(post_only))
        .route("/api/process/", post(process_image).fallback(post_only))
        .with_state(state)
}

async fn post_only() -> AppError {
    AppError::BadRequest("Solo POST".to_string())
}

/// Rimuove lo sfondo e restituisce l'immagine come data URI
#[utoipa::path(
    post,
    path = "/api/process",
    request_body(content_type = "multipart/form-data", description = "Campi: image (file), background_type (color), background_value (#FFFFFF)"),
    responses(
        (status = 200, description = "Immagine elaborata", body = ProcessResponse),
        (status = 400, description = "Validazione fallita", body = ErrorResponse),
        (status = 500, description = "Errore di elaborazione", body = ErrorResponse),
    ),
    tag = "Elaborazione"
)]
pub async fn process_image(
    State(state): State<ProcessState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessResponse>> {
    let form = read_upload_form(multipart, state.max_file_size_mb).await?;
    let upload = form.require_image()?;

    tracing::info!(
        filename = upload.filename.as_deref().unwrap_or("-"),
        bytes = upload.data.len(),
        "Elaborazione immagine"
    );

    let info = validate_upload(&upload.data, state.max_file_size_mb).map_err(|e| {
        tracing::warn!(error = %e, "Validazione fallita");
        e
    })?;
    let background = BackgroundSpec::parse(form.background_type(), form.background_value())?;

    tracing::debug!(format = ?info.format, background = %background.kind(), "Upload valido");

    let png = process_inline(
        state.segmenter.as_ref(),
        &upload.data,
        &background,
        state.model,
        state.working_max_dimension,
    )
    .await?;

    tracing::info!(bytes = png.len(), "Elaborazione completata");

    Ok(Json(ProcessResponse::success(to_data_uri("image/png", &png))))
}
