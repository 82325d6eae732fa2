//! Modulo per la gestione dei job nel database

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::DbPool;
use crate::models::{BackgroundKind, BackgroundSpec, JobStatus, SegmentationModel};

/// Record job nel database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct JobRecord {
    pub id: i64,
    /// Riferimento al file originale (area `originals/`)
    pub original_image: String,
    /// Riferimento al risultato (area `processed/`), presente solo con stato DONE
    pub processed_image: Option<String>,
    pub background_type: BackgroundKind,
    pub background_value: String,
    pub model_used: SegmentationModel,
    pub status: JobStatus,
    pub file_size: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub created_at: String,
}

impl JobRecord {
    pub fn background(&self) -> BackgroundSpec {
        BackgroundSpec::new(self.background_type, self.background_value.clone())
    }
}

/// Dati per la creazione di un job
#[derive(Debug, Clone)]
pub struct NewJob {
    pub original_image: String,
    pub background: BackgroundSpec,
    pub model_used: SegmentationModel,
    pub file_size: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Query per lista job
#[derive(Debug, Deserialize, ToSchema)]
pub struct JobsQuery {
    pub status: Option<JobStatus>,
    pub model_used: Option<SegmentationModel>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Default for JobsQuery {
    fn default() -> Self {
        Self {
            status: None,
            model_used: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    50
}

/// Response lista job
#[derive(Debug, Serialize, ToSchema)]
pub struct JobsListResponse {
    pub jobs: Vec<JobRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

const JOB_COLUMNS: &str = "id, original_image, processed_image, background_type, \
    background_value, model_used, status, file_size, width, height, created_at";

/// Crea un nuovo job nel database con stato PENDING
pub async fn create_job(pool: &DbPool, job: &NewJob) -> Result<JobRecord, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO image_jobs (
            original_image, processed_image, background_type, background_value,
            model_used, status, file_size, width, height, created_at
        ) VALUES (?, NULL, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&job.original_image)
    .bind(job.background.kind())
    .bind(job.background.value())
    .bind(job.model_used)
    .bind(JobStatus::Pending)
    .bind(job.file_size)
    .bind(job.width)
    .bind(job.height)
    .bind(&now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    get_job(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Ottieni un job per ID
pub async fn get_job(pool: &DbPool, id: i64) -> Result<Option<JobRecord>, sqlx::Error> {
    let sql = format!("SELECT {} FROM image_jobs WHERE id = ?", JOB_COLUMNS);
    sqlx::query_as::<_, JobRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lista job con filtri e paginazione
pub async fn list_jobs(pool: &DbPool, query: &JobsQuery) -> Result<JobsListResponse, sqlx::Error> {
    let mut filter = String::from(" WHERE 1=1");
    if query.status.is_some() {
        filter.push_str(" AND status = ?");
    }
    if query.model_used.is_some() {
        filter.push_str(" AND model_used = ?");
    }

    // Esegui count
    let count_sql = format!("SELECT COUNT(*) FROM image_jobs{}", filter);
    let total: (i64,) = {
        let mut q = sqlx::query_as(&count_sql);
        if let Some(status) = query.status {
            q = q.bind(status);
        }
        if let Some(model) = query.model_used {
            q = q.bind(model);
        }
        q.fetch_one(pool).await?
    };

    let data_sql = format!(
        "SELECT {} FROM image_jobs{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        JOB_COLUMNS, filter
    );
    let jobs: Vec<JobRecord> = {
        let mut q = sqlx::query_as::<_, JobRecord>(&data_sql);
        if let Some(status) = query.status {
            q = q.bind(status);
        }
        if let Some(model) = query.model_used {
            q = q.bind(model);
        }
        q.bind(query.limit).bind(query.offset).fetch_all(pool).await?
    };

    Ok(JobsListResponse {
        jobs,
        total: total.0,
        limit: query.limit,
        offset: query.offset,
    })
}

/// Marca un job come completato salvando il riferimento al risultato.
/// Restituisce false se il job non esiste o è già in uno stato finale.
pub async fn mark_job_done(
    pool: &DbPool,
    id: i64,
    processed_image: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE image_jobs SET status = ?, processed_image = ?
        WHERE id = ? AND status IN ('PENDING', 'PROCESSING')
        "#,
    )
    .bind(JobStatus::Done)
    .bind(processed_image)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Marca un job come fallito. Nessun dettaglio dell'errore viene salvato.
pub async fn mark_job_failed(pool: &DbPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE image_jobs SET status = ?, processed_image = NULL
        WHERE id = ? AND status IN ('PENDING', 'PROCESSING')
        "#,
    )
    .bind(JobStatus::Failed)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_job(model: SegmentationModel) -> NewJob {
        NewJob {
            original_image: "originals/test.png".to_string(),
            background: BackgroundSpec::Color {
                value: "#FFFFFF".to_string(),
            },
            model_used: model,
            file_size: 1234,
            width: Some(40),
            height: Some(20),
        }
    }

    #[tokio::test]
    async fn test_create_job_is_pending() {
        let pool = test_pool().await;
        let job = create_job(&pool, &new_job(SegmentationModel::Isnet))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.processed_image.is_none());
        assert_eq!(job.background_type, BackgroundKind::Color);
        assert_eq!(job.background_value, "#FFFFFF");
        assert_eq!(job.width, Some(40));
        assert!(!job.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let pool = test_pool().await;
        let first = create_job(&pool, &new_job(SegmentationModel::Isnet))
            .await
            .unwrap();
        let second = create_job(&pool, &new_job(SegmentationModel::Bria))
            .await
            .unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn test_get_missing_job() {
        let pool = test_pool().await;
        assert!(get_job(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_done_sets_processed_image() {
        let pool = test_pool().await;
        let job = create_job(&pool, &new_job(SegmentationModel::Isnet))
            .await
            .unwrap();

        assert!(mark_job_done(&pool, job.id, "processed/result_1.png")
            .await
            .unwrap());

        let job = get_job(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.processed_image.as_deref(), Some("processed/result_1.png"));

        // Nessuna transizione da uno stato finale
        assert!(!mark_job_failed(&pool, job.id).await.unwrap());
        let job = get_job(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);
    }

    #[tokio::test]
    async fn test_mark_failed_keeps_processed_empty() {
        let pool = test_pool().await;
        let job = create_job(&pool, &new_job(SegmentationModel::Bria))
            .await
            .unwrap();

        assert!(mark_job_failed(&pool, job.id).await.unwrap());
        let job = get_job(&pool, job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.processed_image.is_none());

        assert!(!mark_job_done(&pool, job.id, "processed/late.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_jobs_filters() {
        let pool = test_pool().await;
        let a = create_job(&pool, &new_job(SegmentationModel::Isnet))
            .await
            .unwrap();
        create_job(&pool, &new_job(SegmentationModel::Bria))
            .await
            .unwrap();
        create_job(&pool, &new_job(SegmentationModel::Bria))
            .await
            .unwrap();
        mark_job_failed(&pool, a.id).await.unwrap();

        let all = list_jobs(&pool, &JobsQuery::default()).await.unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.jobs.len(), 3);

        let bria = list_jobs(
            &pool,
            &JobsQuery {
                model_used: Some(SegmentationModel::Bria),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(bria.total, 2);
        assert!(bria
            .jobs
            .iter()
            .all(|j| j.model_used == SegmentationModel::Bria));

        let failed = list_jobs(
            &pool,
            &JobsQuery {
                status: Some(JobStatus::Failed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(failed.total, 1);
        assert_eq!(failed.jobs[0].id, a.id);

        let page = list_jobs(
            &pool,
            &JobsQuery {
                limit: 1,
                offset: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.jobs.len(), 1);
    }
}
