use image::ImageFormat;

use crate::error::{AppError, Result};

/// Estensione canonica per un formato riconosciuto
pub fn extension_for(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("bin")
}

pub fn validate_file_size(size: u64, max_size_mb: u64) -> Result<()> {
    let max_bytes = max_size_mb * 1024 * 1024;
    if size > max_bytes {
        return Err(AppError::FileTooLarge(max_size_mb));
    }
    Ok(())
}
