use image::{imageops, imageops::FilterType, DynamicImage, Rgba, RgbaImage};

use crate::error::Result;
use crate::handlers::resize::fit_within;
use crate::utils::encode_png;

/// Sorgente dello sfondo già risolta: colore pieno o immagine decodificata
#[derive(Debug, Clone)]
pub enum Background {
    Color(Rgba<u8>),
    Image(DynamicImage),
}

/// Costruisce la superficie di sfondo delle dimensioni indicate.
///
/// Un'immagine viene prima limitata a `max_dimension` e poi forzata
/// esattamente a `width x height`, senza mantenere le proporzioni.
pub fn build_surface(
    background: Background,
    width: u32,
    height: u32,
    max_dimension: u32,
) -> RgbaImage {
    match background {
        Background::Color(color) => RgbaImage::from_pixel(width, height, color),
        Background::Image(img) => {
            let img = fit_within(DynamicImage::ImageRgba8(img.to_rgba8()), max_dimension);
            img.resize_exact(width, height, FilterType::Lanczos3)
                .to_rgba8()
        }
    }
}

/// Compone il primo piano sopra lo sfondo usando l'alpha del primo piano
pub fn composite(foreground: &RgbaImage, background: Background, max_dimension: u32) -> RgbaImage {
    let (width, height) = foreground.dimensions();
    let mut surface = build_surface(background, width, height, max_dimension);
    imageops::overlay(&mut surface, foreground, 0, 0);
    surface
}

/// Decodifica il primo piano, applica lo sfondo e restituisce un PNG ottimizzato
pub fn add_background(
    foreground_bytes: &[u8],
    background: Background,
    max_dimension: u32,
) -> Result<Vec<u8>> {
    let foreground = image::load_from_memory(foreground_bytes)?.to_rgba8();
    let result = composite(&foreground, background, max_dimension);
    encode_png(&DynamicImage::ImageRgba8(result))
}
