use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgba, Rgba32FImage, RgbaImage};

/// Dimensioni ridotte in modo che il lato maggiore non superi `max_dimension`,
/// mantenendo le proporzioni (arrotondamento al pixel più vicino)
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension {
        return (width, height);
    }

    let scale = max_dimension as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Ridimensiona l'immagine se il lato maggiore supera `max_dimension`.
/// Se l'immagine rientra già nel limite viene restituita invariata.
pub fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let (w, h) = scaled_dimensions(width, height, max_dimension);
    if (w, h) == (width, height) {
        return img;
    }

    img.resize_exact(w, h, FilterType::Lanczos3)
}

/// Ridimensiona un'immagine RGBA con alpha premoltiplicato.
///
/// Il colore dei pixel trasparenti non contribuisce ai bordi del primo piano,
/// quindi il contorno mantiene il proprio colore invece di scurirsi.
pub fn resize_premultiplied(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        let a = p[3] as f32 / 255.0;
        Rgba([
            p[0] as f32 / 255.0 * a,
            p[1] as f32 / 255.0 * a,
            p[2] as f32 / 255.0 * a,
            a,
        ])
    });

    let resized = imageops::resize(&premultiplied, width, height, FilterType::Lanczos3);

    RgbaImage::from_fn(width, height, |x, y| {
        let p = resized.get_pixel(x, y);
        // Lanczos può uscire da [0, 1]
        let a = p[3].clamp(0.0, 1.0);
        if a <= f32::EPSILON {
            return Rgba([0, 0, 0, 0]);
        }
        let channel = |v: f32| ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([
            channel(p[0]),
            channel(p[1]),
            channel(p[2]),
            (a * 255.0).round() as u8,
        ])
    })
}
