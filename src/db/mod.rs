pub mod jobs;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::time::Duration;

pub type DbPool = SqlitePool;

/// Inizializza il database SQLite
pub async fn init_db(database_url: &str) -> Result<DbPool, sqlx::Error> {
    // Crea il pool di connessioni
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .idle_timeout(Duration::from_secs(60))
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    // Esegui le migrazioni
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Esegue le migrazioni del database
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // processed_image presente se e solo se lo stato è DONE
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image_jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            original_image TEXT NOT NULL,
            processed_image TEXT,
            background_type TEXT NOT NULL,
            background_value TEXT NOT NULL,
            model_used TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            file_size INTEGER NOT NULL,
            width INTEGER,
            height INTEGER,
            created_at TEXT NOT NULL,
            CHECK ((status = 'DONE') = (processed_image IS NOT NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indici per i filtri della lista job
    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_image_jobs_status ON image_jobs(status)"#)
        .execute(pool)
        .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_image_jobs_model ON image_jobs(model_used)"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE INDEX IF NOT EXISTS idx_image_jobs_created_at ON image_jobs(created_at)"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Pool in memoria per i test: una sola connessione, altrimenti ogni
/// connessione vedrebbe un database diverso
#[cfg(test)]
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
