use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Stato dell'API
    pub status: String,
    /// Versione dell'API
    pub version: String,
    /// Server di segmentazione configurato (altrimenti modello passthrough)
    pub segmenter_configured: bool,
    /// Formati accettati in upload
    pub supported_formats: Vec<String>,
    /// Limite massimo dimensione file in MB
    pub max_file_size_mb: u64,
}

/// Risultato dell'endpoint inline
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// Data URI `data:image/png;base64,...`
    pub image: String,
    /// Sempre `SUCCESS`
    pub status: String,
}

impl ProcessResponse {
    pub fn success(image: String) -> Self {
        Self {
            image,
            status: "SUCCESS".to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreflightResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}
