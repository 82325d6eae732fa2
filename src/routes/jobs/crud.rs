//! CRUD operations for jobs

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::io::Cursor;

use crate::db::jobs::{self as db_jobs, JobRecord, JobsListResponse, JobsQuery, NewJob};
use crate::error::{AppError, Result};
use crate::models::{BackgroundKind, BackgroundSpec, ErrorResponse, JobStatus, SegmentationModel};
use crate::routes::upload::{read_upload_form, UploadForm};
use crate::services::{FileStorage, StorageArea};
use crate::utils::{extension_for, validate_upload};

use super::JobsState;

/// Lista i job con paginazione e filtri
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    params(
        ("status" = Option<String>, Query, description = "Filtra per stato (PENDING, PROCESSING, DONE, FAILED)"),
        ("model_used" = Option<String>, Query, description = "Filtra per modello (isnet, bria)"),
        ("limit" = Option<i64>, Query, description = "Limite risultati (default 50)"),
        ("offset" = Option<i64>, Query, description = "Offset per paginazione"),
    ),
    responses(
        (status = 200, description = "Lista job", body = JobsListResponse),
    )
)]
pub async fn list_jobs(
    State(state): State<JobsState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<JobsListResponse>> {
    let response = db_jobs::list_jobs(&state.db, &query).await?;
    Ok(Json(response))
}

/// Crea un job, lo elabora subito e restituisce il record finale
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    request_body(content_type = "multipart/form-data", description = "Campi: image (file), background_type, background_value, model_used, background_image (file opzionale)"),
    responses(
        (status = 201, description = "Job creato ed elaborato", body = JobRecord),
        (status = 400, description = "Richiesta non valida", body = ErrorResponse),
    )
)]
pub async fn create_job(
    State(state): State<JobsState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let form = read_upload_form(multipart, state.max_file_size_mb).await?;
    let upload = form.require_image()?;

    let info = validate_upload(&upload.data, state.max_file_size_mb)?;
    let (width, height) = image::ImageReader::new(Cursor::new(&upload.data))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| AppError::UnsupportedFormat(format!("immagine non leggibile: {}", e)))?;

    let model_used = match form.model_used.as_deref() {
        Some(m) if !m.is_empty() => m.parse::<SegmentationModel>()?,
        _ => state.default_model,
    };
    let background = resolve_background_field(&state, &form).await?;

    let original_image = state
        .storage
        .save(
            StorageArea::Originals,
            &FileStorage::unique_name(extension_for(info.format)),
            &upload.data,
        )
        .await?;

    let job = db_jobs::create_job(
        &state.db,
        &NewJob {
            original_image,
            background,
            model_used,
            file_size: info.size_bytes as i64,
            width: Some(width as i64),
            height: Some(height as i64),
        },
    )
    .await?;

    tracing::info!(job_id = job.id, model = %job.model_used, "Job creato");

    state.processor.process(job.id).await?;

    let job = db_jobs::get_job(&state.db, job.id)
        .await?
        .ok_or(AppError::JobNotFound(job.id))?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// Sfondo del job: con tipo `image` un file `background_image` caricato ha la
/// precedenza, altrimenti `background_value` deve riferire un file già salvato
async fn resolve_background_field(state: &JobsState, form: &UploadForm) -> Result<BackgroundSpec> {
    let kind: BackgroundKind = form.background_type().parse()?;

    match (kind, &form.background_image) {
        (BackgroundKind::Image, Some(file)) => {
            let info = validate_upload(&file.data, state.max_file_size_mb)?;
            let reference = state
                .storage
                .save(
                    StorageArea::Backgrounds,
                    &FileStorage::unique_name(extension_for(info.format)),
                    &file.data,
                )
                .await?;
            Ok(BackgroundSpec::Image { reference })
        }
        (BackgroundKind::Image, None) => {
            let reference = form
                .background_value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::MissingField("background_image".to_string()))?;
            state.storage.resolve(&reference).map_err(|_| {
                AppError::BadRequest(format!("Riferimento sfondo non valido: {}", reference))
            })?;
            Ok(BackgroundSpec::Image { reference })
        }
        (BackgroundKind::Color, _) => {
            BackgroundSpec::parse(kind.as_str(), form.background_value())
        }
    }
}

/// Ottieni lo stato di un job
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(
        ("id" = i64, Path, description = "ID del job")
    ),
    responses(
        (status = 200, description = "Record completo del job", body = JobRecord),
        (status = 404, description = "Job non trovato", body = ErrorResponse),
    )
)]
pub async fn get_job_status(
    State(state): State<JobsState>,
    Path(id): Path<i64>,
) -> Result<Json<JobRecord>> {
    let job = db_jobs::get_job(&state.db, id)
        .await?
        .ok_or(AppError::JobNotFound(id))?;

    Ok(Json(job))
}

/// Scarica il risultato di un job completato
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/result",
    tag = "Jobs",
    params(
        ("id" = i64, Path, description = "ID del job")
    ),
    responses(
        (status = 200, description = "Immagine elaborata", content_type = "image/png"),
        (status = 404, description = "Job non trovato", body = ErrorResponse),
        (status = 409, description = "Job non completato", body = ErrorResponse),
    )
)]
pub async fn download_job_result(
    State(state): State<JobsState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let job = db_jobs::get_job(&state.db, id)
        .await?
        .ok_or(AppError::JobNotFound(id))?;

    let reference = match (&job.status, &job.processed_image) {
        (JobStatus::Done, Some(reference)) => reference,
        _ => return Err(AppError::JobNotCompleted(job.status.to_string())),
    };

    let data = state.storage.read(reference).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", FileStorage::processed_name(id)),
            ),
        ],
        data,
    ))
}
