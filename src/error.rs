use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Formato non supportato: {0}")]
    UnsupportedFormat(String),

    #[error("File troppo grande (massimo {0} MB)")]
    FileTooLarge(u64),

    #[error("Campo multipart mancante: {0}")]
    MissingField(String),

    #[error("Tipo di sfondo non valido: {0}")]
    InvalidBackgroundType(String),

    #[error("Colore non valido: {0}")]
    InvalidColor(String),

    #[error("Modello non valido: {0}")]
    InvalidModel(String),

    #[error("Richiesta non valida: {0}")]
    BadRequest(String),

    #[error("Job non trovato: {0}")]
    JobNotFound(i64),

    #[error("Job non completato: stato {0}")]
    JobNotCompleted(String),

    #[error("Riferimento file non valido: {0}")]
    InvalidReference(String),

    #[error("Errore di I/O: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Errore immagine: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Errore database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Errore di segmentazione: {0}")]
    Segmentation(String),

    #[error("Errore interno: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge(_) => StatusCode::BAD_REQUEST,
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBackgroundType(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidColor(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidModel(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::JobNotFound(_) => StatusCode::NOT_FOUND,
            AppError::JobNotCompleted(_) => StatusCode::CONFLICT,
            AppError::InvalidReference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ImageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Segmentation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Errori dovuti all'input del client (risposta 400)
    pub fn is_validation(&self) -> bool {
        self.status_code() == StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Errore durante la richiesta");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
