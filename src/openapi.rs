use utoipa::OpenApi;

use crate::db::jobs::{JobRecord, JobsListResponse};
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sfondo API",
        version = "1.0.0",
        description = "API per la rimozione e la sostituzione dello sfondo delle immagini",
        license(name = "MIT"),
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::process::process_image,
        crate::routes::jobs::list_jobs,
        crate::routes::jobs::create_job,
        crate::routes::jobs::get_job_status,
        crate::routes::jobs::download_job_result,
    ),
    components(schemas(
        HealthResponse,
        ProcessResponse,
        PreflightResponse,
        ErrorResponse,
        JobRecord,
        JobsListResponse,
        JobStatus,
        SegmentationModel,
        BackgroundKind,
    )),
    tags(
        (name = "Elaborazione", description = "Rimozione sfondo con risultato inline"),
        (name = "Jobs", description = "Job di elaborazione salvati"),
        (name = "Sistema", description = "Health check e info"),
    ),
    servers(
        (url = "http://localhost:8000", description = "Server locale"),
    )
)]
pub struct ApiDoc;
