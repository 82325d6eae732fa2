use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sfondo::config::Config;
use sfondo::db;
use sfondo::routes;
use sfondo::services::{FileStorage, PassthroughSegmenter, RemoteSegmenter, SharedSegmenter};

#[tokio::main]
async fn main() {
    // Carica variabili da .env
    dotenvy::dotenv().ok();

    // Inizializza logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sfondo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Carica configurazione
    let config = Config::from_env();

    tracing::info!("Connessione al database: {}", config.database_url);

    let db_pool = match db::init_db(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Database SQLite inizializzato");
            pool
        }
        Err(e) => {
            tracing::error!("Errore inizializzazione database: {}", e);
            std::process::exit(1);
        }
    };

    // Directory dei file caricati e dei risultati
    let storage = FileStorage::new(&config.media_root);
    if let Err(e) = storage.ensure_dirs().await {
        tracing::error!(
            "Impossibile creare le directory in {}: {}",
            config.media_root.display(),
            e
        );
        std::process::exit(1);
    }

    // Modello di segmentazione
    let segmenter: SharedSegmenter = match &config.segmenter_url {
        Some(url) => {
            match RemoteSegmenter::new(url, Duration::from_secs(config.segmenter_timeout_secs)) {
                Ok(remote) => {
                    tracing::info!("Server di segmentazione: {}", remote.endpoint());
                    Arc::new(remote)
                }
                Err(e) => {
                    tracing::error!("Errore configurazione segmentazione: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            tracing::warn!(
                "SFONDO_SEGMENTER_URL non impostato - uso del modello passthrough (sfondo non rimosso)"
            );
            Arc::new(PassthroughSegmenter)
        }
    };

    let app = routes::build_app(routes::create_router(
        db_pool,
        storage,
        segmenter,
        &config,
    ));

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Indirizzo non valido {}:{}: {}", config.host, config.port, e);
            std::process::exit(1);
        }
    };

    tracing::info!("========================================");
    tracing::info!("  Sfondo API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("========================================");
    tracing::info!("Server: http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    tracing::info!("Modello predefinito: {}", config.default_model);
    tracing::info!("Limite upload: {} MB", config.max_file_size_mb);
    tracing::info!("----------------------------------------");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /api/health              - Health check");
    tracing::info!("  POST /api/process/            - Rimozione sfondo inline (base64)");
    tracing::info!("  GET  /api/jobs                - Lista job");
    tracing::info!("  POST /api/jobs                - Crea ed elabora job");
    tracing::info!("  GET  /api/jobs/:id            - Stato job");
    tracing::info!("  GET  /api/jobs/:id/result     - Scarica risultato");
    tracing::info!("----------------------------------------");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Impossibile aprire {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Errore server: {}", e);
        std::process::exit(1);
    }
}
