use std::path::PathBuf;

use crate::models::SegmentationModel;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_file_size_mb: u64,
    pub media_root: PathBuf,
    /// Lato massimo prima della segmentazione nei job
    pub processing_max_dimension: u32,
    /// Lato massimo di lavoro per l'endpoint inline
    pub inline_max_dimension: u32,
    pub segmenter_url: Option<String>,
    pub segmenter_timeout_secs: u64,
    pub default_model: SegmentationModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: "sqlite:sfondo.db?mode=rwc".to_string(),
            max_file_size_mb: 100,
            media_root: PathBuf::from("media"),
            processing_max_dimension: 4096,
            inline_max_dimension: 1024,
            segmenter_url: None,
            segmenter_timeout_secs: 300,
            default_model: SegmentationModel::Isnet,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SFONDO_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("SFONDO_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(size) = std::env::var("SFONDO_MAX_FILE_SIZE_MB") {
            if let Ok(s) = size.parse() {
                config.max_file_size_mb = s;
            }
        }

        if let Ok(dir) = std::env::var("SFONDO_MEDIA_ROOT") {
            config.media_root = PathBuf::from(dir);
        }

        if let Ok(dim) = std::env::var("SFONDO_PROCESSING_MAX_DIMENSION") {
            if let Ok(d) = dim.parse() {
                config.processing_max_dimension = d;
            }
        }

        if let Ok(dim) = std::env::var("SFONDO_INLINE_MAX_DIMENSION") {
            if let Ok(d) = dim.parse() {
                config.inline_max_dimension = d;
            }
        }

        if let Ok(url) = std::env::var("SFONDO_SEGMENTER_URL") {
            if !url.trim().is_empty() {
                config.segmenter_url = Some(url.trim_end_matches('/').to_string());
            }
        }

        if let Ok(timeout) = std::env::var("SFONDO_SEGMENTER_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                config.segmenter_timeout_secs = t;
            }
        }

        if let Ok(model) = std::env::var("SFONDO_DEFAULT_MODEL") {
            match model.parse() {
                Ok(m) => config.default_model = m,
                Err(e) => tracing::warn!("SFONDO_DEFAULT_MODEL ignorato: {}", e),
            }
        }

        config
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Limite del body multipart: il file più un margine per i campi del form
    pub fn max_body_bytes(&self) -> usize {
        (self.max_file_size_bytes() + 1024 * 1024) as usize
    }
}

// Formati supportati
pub mod formats {
    use image::ImageFormat;

    /// Formati accettati in upload, riconosciuti dal contenuto e non dall'estensione.
    /// AVIF è escluso: il decoder richiede dav1d come libreria di sistema.
    pub const UPLOAD_INPUT: &[ImageFormat] = &[
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::WebP,
        ImageFormat::Bmp,
        ImageFormat::Gif,
    ];

    pub fn is_supported_upload(format: ImageFormat) -> bool {
        UPLOAD_INPUT.contains(&format)
    }

    pub fn upload_format_names() -> Vec<String> {
        UPLOAD_INPUT
            .iter()
            .map(|f| f.extensions_str()[0].to_string())
            .collect()
    }
}
