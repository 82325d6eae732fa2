//! Segmentation model capability
//!
//! The model itself is an external collaborator: the service only needs
//! `segment(image, model, params) -> image with alpha`. Implementations:
//!
//! - [`RemoteSegmenter`]: rembg-compatible HTTP server (`POST /api/remove`)
//! - [`PassthroughSegmenter`]: returns the input unchanged as RGBA, used when no
//!   server is configured

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::SegmentationModel;
use crate::utils::encode_png;

/// Parametri di alpha matting passati al modello
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MattingParams {
    pub alpha_matting: bool,
    pub foreground_threshold: u8,
    pub background_threshold: u8,
    pub erode_size: u32,
}

impl MattingParams {
    /// Matting attivo con soglie fisse, usato dai job
    pub const fn refined() -> Self {
        Self {
            alpha_matting: true,
            foreground_threshold: 240,
            background_threshold: 10,
            erode_size: 10,
        }
    }

    /// Solo la maschera del modello, usato dall'endpoint inline
    pub const fn disabled() -> Self {
        Self {
            alpha_matting: false,
            ..Self::refined()
        }
    }
}

#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Separa il primo piano: il risultato ha il canale alpha a zero sullo sfondo
    async fn segment(
        &self,
        image: DynamicImage,
        model: SegmentationModel,
        params: MattingParams,
    ) -> Result<DynamicImage>;

    fn name(&self) -> &'static str;
}

pub type SharedSegmenter = Arc<dyn Segmenter>;

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSegmenter;

#[async_trait]
impl Segmenter for PassthroughSegmenter {
    async fn segment(
        &self,
        image: DynamicImage,
        _model: SegmentationModel,
        _params: MattingParams,
    ) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgba8(image.to_rgba8()))
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

/// Client per un server di segmentazione compatibile con `rembg s`
#[derive(Debug, Clone)]
pub struct RemoteSegmenter {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSegmenter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Errore client HTTP: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/remove", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Segmenter for RemoteSegmenter {
    async fn segment(
        &self,
        image: DynamicImage,
        model: SegmentationModel,
        params: MattingParams,
    ) -> Result<DynamicImage> {
        // Formato intermedio senza perdita
        let png = encode_png(&image)?;

        let part = Part::bytes(png)
            .file_name("image.png")
            .mime_str("image/png")
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", model.rembg_name())
            .text("a", params.alpha_matting.to_string())
            .text("af", params.foreground_threshold.to_string())
            .text("ab", params.background_threshold.to_string())
            .text("ae", params.erode_size.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Segmentation(format!("richiesta fallita: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Segmentation(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Segmentation(format!("lettura risposta: {}", e)))?;

        Ok(image::load_from_memory(&bytes)?)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Router};
    use image::{GenericImageView, Rgba, RgbaImage};
    use std::collections::HashMap;

    #[test]
    fn test_matting_params() {
        let refined = MattingParams::refined();
        assert!(refined.alpha_matting);
        assert_eq!(refined.foreground_threshold, 240);
        assert_eq!(refined.background_threshold, 10);
        assert_eq!(refined.erode_size, 10);
        assert!(!MattingParams::disabled().alpha_matting);
    }

    #[tokio::test]
    async fn test_passthrough_adds_alpha() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(4, 3));
        let out = PassthroughSegmenter
            .segment(img, SegmentationModel::Isnet, MattingParams::refined())
            .await
            .unwrap();
        assert_eq!(out.dimensions(), (4, 3));
        assert!(out.color().has_alpha());
    }

    /// Finto server rembg: verifica i campi del form e restituisce un PNG
    /// con la colonna sinistra trasparente
    async fn fake_remove(mut multipart: Multipart) -> (StatusCode, Vec<u8>) {
        let mut fields = HashMap::new();
        let mut file = None;
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let data = field.bytes().await.unwrap();
            if name == "file" {
                file = Some(data);
            } else {
                fields.insert(name, String::from_utf8(data.to_vec()).unwrap());
            }
        }

        if fields.get("model").map(String::as_str) != Some("bria-rmbg")
            || fields.get("a").map(String::as_str) != Some("true")
            || fields.get("af").map(String::as_str) != Some("240")
            || fields.get("ab").map(String::as_str) != Some("10")
            || fields.get("ae").map(String::as_str) != Some("10")
        {
            return (StatusCode::UNPROCESSABLE_ENTITY, b"bad form".to_vec());
        }

        let input = image::load_from_memory(&file.unwrap()).unwrap().to_rgba8();
        let out = RgbaImage::from_fn(input.width(), input.height(), |x, y| {
            let p = input.get_pixel(x, y);
            Rgba([p[0], p[1], p[2], if x == 0 { 0 } else { 255 }])
        });
        let bytes = encode_png(&DynamicImage::ImageRgba8(out)).unwrap();
        (StatusCode::OK, bytes)
    }

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_remote_segmenter_round_trip() {
        let base = spawn_server(Router::new().route("/api/remove", post(fake_remove))).await;
        let segmenter = RemoteSegmenter::new(&base, Duration::from_secs(10)).unwrap();
        assert!(segmenter.endpoint().ends_with("/api/remove"));

        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(5, 4, image::Rgb([9, 9, 9])));
        let out = segmenter
            .segment(img, SegmentationModel::Bria, MattingParams::refined())
            .await
            .unwrap()
            .to_rgba8();

        assert_eq!(out.dimensions(), (5, 4));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(*out.get_pixel(4, 3), Rgba([9, 9, 9, 255]));
    }

    #[tokio::test]
    async fn test_remote_segmenter_http_error() {
        let base = spawn_server(Router::new().route(
            "/api/remove",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
        ))
        .await;
        let segmenter = RemoteSegmenter::new(&base, Duration::from_secs(10)).unwrap();

        let img = DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        let err = segmenter
            .segment(img, SegmentationModel::Isnet, MattingParams::refined())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Segmentation(ref m) if m.contains("model crashed")));
    }
}
