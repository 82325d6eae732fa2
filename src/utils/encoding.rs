//! Shared image encoding utilities

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;

use crate::error::Result;

/// Encode a DynamicImage as optimized PNG
///
/// Uses the best compression level with adaptive filtering; the output is
/// lossless and keeps the alpha channel when the image has one.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut buffer,
        image::codecs::png::CompressionType::Best,
        image::codecs::png::FilterType::Adaptive,
    );
    img.write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// Build a `data:` URI for inline responses
pub fn to_data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn create_test_image() -> DynamicImage {
        let img = RgbaImage::from_fn(10, 10, |x, _| image::Rgba([255, 0, 0, (x * 25) as u8]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let img = create_test_image();
        let bytes = encode_png(&img).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Png
        );

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img.to_rgba8());
    }

    #[test]
    fn test_data_uri() {
        let uri = to_data_uri("image/png", b"abc");
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }
}
