//! Validation of uploaded images

use image::ImageFormat;

use crate::config::formats;
use crate::error::{AppError, Result};
use crate::utils::file::validate_file_size;

/// Informazioni ricavate dalla validazione di un upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadInfo {
    pub format: ImageFormat,
    pub size_bytes: u64,
}

/// Validate an uploaded file
///
/// Checks the size against `max_size_mb` and detects the format from the
/// content (magic bytes), ignoring the declared filename or content-type.
///
/// # Returns
/// The detected format if the upload is acceptable
pub fn validate_upload(data: &[u8], max_size_mb: u64) -> Result<UploadInfo> {
    let size_bytes = data.len() as u64;
    validate_file_size(size_bytes, max_size_mb)?;

    let format = image::guess_format(data)
        .map_err(|_| AppError::UnsupportedFormat("tipo di file non riconosciuto".to_string()))?;

    if !formats::is_supported_upload(format) {
        return Err(AppError::UnsupportedFormat(format!(
            "{:?} (ammessi: {})",
            format,
            formats::upload_format_names().join(", ")
        )));
    }

    Ok(UploadInfo { format, size_bytes })
}
