use image::{DynamicImage, GenericImageView};

use crate::error::Result;
use crate::handlers::compositor::{composite, Background};
use crate::handlers::resize::{fit_within, resize_premultiplied};
use crate::models::{parse_color, BackgroundSpec, SegmentationModel};
use crate::services::segmenter::{MattingParams, Segmenter};
use crate::utils::encode_png;

/// Pipeline dell'endpoint inline.
///
/// Lavora a risoluzione ridotta (`working_max_dimension`) per velocità, poi
/// riporta il primo piano alla risoluzione originale. Con uno sfondo a colore
/// il risultato è composto sul colore; con qualunque altro tipo resta
/// trasparente.
pub async fn process_inline(
    segmenter: &dyn Segmenter,
    image_bytes: &[u8],
    background: &BackgroundSpec,
    model: SegmentationModel,
    working_max_dimension: u32,
) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes)?;
    let original_size = img.dimensions();

    let working = fit_within(img, working_max_dimension);
    if working.dimensions() != original_size {
        tracing::info!(
            from = ?original_size,
            to = ?working.dimensions(),
            "Immagine ridotta per l'elaborazione"
        );
    }

    tracing::info!(model = %model, segmenter = segmenter.name(), "Rimozione sfondo in corso");
    let foreground = segmenter
        .segment(working, model, MattingParams::disabled())
        .await?;

    let mut foreground = DynamicImage::ImageRgba8(foreground.to_rgba8());
    if foreground.dimensions() != original_size {
        tracing::info!(to = ?original_size, "Ripristino della risoluzione originale");
        foreground = DynamicImage::ImageRgba8(resize_premultiplied(
            &foreground.to_rgba8(),
            original_size.0,
            original_size.1,
        ));
    }

    tracing::info!(background = %background.kind(), "Applicazione sfondo");
    let result = match background {
        BackgroundSpec::Color { value } => {
            let color = parse_color(value)?;
            let composed = composite(&foreground.to_rgba8(), Background::Color(color), u32::MAX);
            if color[3] == u8::MAX {
                DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(composed).to_rgb8())
            } else {
                DynamicImage::ImageRgba8(composed)
            }
        }
        BackgroundSpec::Image { .. } => foreground,
    };

    tracing::info!("Codifica PNG");
    encode_png(&result)
}
