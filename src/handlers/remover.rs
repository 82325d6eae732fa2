use image::DynamicImage;

use crate::error::Result;
use crate::handlers::resize::fit_within;
use crate::models::SegmentationModel;
use crate::services::segmenter::{MattingParams, Segmenter};
use crate::utils::encode_png;

/// Rimuove lo sfondo da un'immagine codificata.
///
/// L'immagine viene decodificata in RGBA, limitata a `max_dimension` e passata
/// al modello con i parametri di matting raffinati. Il risultato è un PNG con
/// canale alpha. Qualsiasi errore di decodifica o del modello viene propagato.
pub async fn remove_background(
    segmenter: &dyn Segmenter,
    image_bytes: &[u8],
    model: SegmentationModel,
    max_dimension: u32,
) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes)?;
    let img = fit_within(DynamicImage::ImageRgba8(img.to_rgba8()), max_dimension);

    tracing::debug!(
        model = %model,
        width = img.width(),
        height = img.height(),
        segmenter = segmenter.name(),
        "Rimozione sfondo"
    );

    let foreground = segmenter
        .segment(img, model, MattingParams::refined())
        .await?;

    encode_png(&DynamicImage::ImageRgba8(foreground.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::segmenter::PassthroughSegmenter;
    use crate::test_utils::{encoded_jpeg, FailingSegmenter, RecordingSegmenter};
    use image::GenericImageView;

    #[tokio::test]
    async fn test_remove_background_returns_png_with_alpha() {
        let input = encoded_jpeg(64, 32);
        let out = remove_background(&PassthroughSegmenter, &input, SegmentationModel::Isnet, 4096)
            .await
            .unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Png);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
        assert!(decoded.color().has_alpha());
    }

    #[tokio::test]
    async fn test_remove_background_caps_size_and_uses_refined_matting() {
        let segmenter = RecordingSegmenter::default();
        let input = encoded_jpeg(200, 100);
        let out = remove_background(&segmenter, &input, SegmentationModel::Bria, 50)
            .await
            .unwrap();

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (50, 25));

        let calls = segmenter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, SegmentationModel::Bria);
        assert_eq!(calls[0].dimensions, (50, 25));
        assert_eq!(calls[0].params, MattingParams::refined());
    }

    #[tokio::test]
    async fn test_remove_background_propagates_model_error() {
        let input = encoded_jpeg(16, 16);
        let result =
            remove_background(&FailingSegmenter, &input, SegmentationModel::Isnet, 4096).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_background_rejects_undecodable_input() {
        let result = remove_background(
            &PassthroughSegmenter,
            b"definitely not an image",
            SegmentationModel::Isnet,
            4096,
        )
        .await;
        assert!(result.is_err());
    }
}
