//! Elaborazione sincrona dei job

use crate::db::jobs::{self as db_jobs, JobRecord};
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::handlers::compositor::{add_background, Background};
use crate::handlers::remover::remove_background;
use crate::models::{parse_color, BackgroundSpec, JobStatus};

use super::segmenter::SharedSegmenter;
use super::storage::{FileStorage, StorageArea};

/// Esegue rimozione sfondo e composizione per un job, aggiornandone lo stato.
///
/// Invocato direttamente nella richiesta, senza coda. Il job passa da PENDING
/// a DONE o FAILED senza salvare uno stato PROCESSING intermedio.
#[derive(Clone)]
pub struct JobProcessor {
    db: DbPool,
    storage: FileStorage,
    segmenter: SharedSegmenter,
    max_dimension: u32,
}

impl JobProcessor {
    pub fn new(
        db: DbPool,
        storage: FileStorage,
        segmenter: SharedSegmenter,
        max_dimension: u32,
    ) -> Self {
        Self {
            db,
            storage,
            segmenter,
            max_dimension,
        }
    }

    /// Elabora il job e restituisce lo stato finale.
    ///
    /// Un errore viene restituito solo se il job non esiste o il database non
    /// risponde; ogni errore di elaborazione porta il job in FAILED senza
    /// salvarne il dettaglio.
    pub async fn process(&self, job_id: i64) -> Result<JobStatus> {
        let job = db_jobs::get_job(&self.db, job_id)
            .await?
            .ok_or(AppError::JobNotFound(job_id))?;

        if job.status.is_terminal() {
            tracing::warn!(job_id, status = %job.status, "Job già concluso, nessuna elaborazione");
            return Ok(job.status);
        }

        tracing::info!(job_id, model = %job.model_used, background = %job.background_type, "Avvio elaborazione job");

        match self.run(&job).await {
            Ok(()) => {
                tracing::info!(job_id, "Job completato");
                Ok(JobStatus::Done)
            }
            Err(e) => {
                tracing::warn!(job_id, error = %e, "Job fallito");
                db_jobs::mark_job_failed(&self.db, job_id).await?;
                Ok(JobStatus::Failed)
            }
        }
    }

    async fn run(&self, job: &JobRecord) -> Result<()> {
        let original = self.storage.read(&job.original_image).await?;

        let foreground = remove_background(
            self.segmenter.as_ref(),
            &original,
            job.model_used,
            self.max_dimension,
        )
        .await?;

        let background = self.resolve_background(&job.background()).await?;
        let result = add_background(&foreground, background, self.max_dimension)?;

        let reference = self
            .storage
            .save(
                StorageArea::Processed,
                &FileStorage::processed_name(job.id),
                &result,
            )
            .await?;

        match db_jobs::mark_job_done(&self.db, job.id, &reference).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.storage.remove(&reference).await;
                Err(AppError::Internal(format!(
                    "job {} non più aggiornabile",
                    job.id
                )))
            }
            Err(e) => {
                self.storage.remove(&reference).await;
                Err(e.into())
            }
        }
    }

    async fn resolve_background(&self, spec: &BackgroundSpec) -> Result<Background> {
        match spec {
            BackgroundSpec::Color { value } => Ok(Background::Color(parse_color(value)?)),
            BackgroundSpec::Image { reference } => {
                let bytes = self.storage.read(reference).await?;
                Ok(Background::Image(image::load_from_memory(&bytes)?))
            }
        }
    }
}
