//! Shared helpers for unit tests

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::SegmentationModel;
use crate::services::segmenter::{MattingParams, Segmenter};

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

pub fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .unwrap();
    buffer.into_inner()
}

pub fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn encoded_tiff(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buffer, ImageFormat::Tiff)
        .unwrap();
    buffer.into_inner()
}

/// Modello che fallisce sempre
pub struct FailingSegmenter;

#[async_trait]
impl Segmenter for FailingSegmenter {
    async fn segment(
        &self,
        _image: DynamicImage,
        _model: SegmentationModel,
        _params: MattingParams,
    ) -> Result<DynamicImage> {
        Err(AppError::Segmentation("modello non disponibile".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Modello deterministico: metà sinistra sfondo, metà destra primo piano
pub struct HalfMaskSegmenter;

#[async_trait]
impl Segmenter for HalfMaskSegmenter {
    async fn segment(
        &self,
        image: DynamicImage,
        _model: SegmentationModel,
        _params: MattingParams,
    ) -> Result<DynamicImage> {
        let rgba = image.to_rgba8();
        let width = rgba.width();
        let out = RgbaImage::from_fn(width, rgba.height(), |x, y| {
            let p = rgba.get_pixel(x, y);
            Rgba([p[0], p[1], p[2], if x < width / 2 { 0 } else { 255 }])
        });
        Ok(DynamicImage::ImageRgba8(out))
    }

    fn name(&self) -> &'static str {
        "half-mask"
    }
}

/// Primo piano bianco a destra, sfondo trasparente nero a sinistra come rembg
pub struct CutoutSegmenter;

#[async_trait]
impl Segmenter for CutoutSegmenter {
    async fn segment(
        &self,
        image: DynamicImage,
        _model: SegmentationModel,
        _params: MattingParams,
    ) -> Result<DynamicImage> {
        let (width, height) = image.dimensions();
        let out = RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        Ok(DynamicImage::ImageRgba8(out))
    }

    fn name(&self) -> &'static str {
        "cutout"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCall {
    pub model: SegmentationModel,
    pub dimensions: (u32, u32),
    pub params: MattingParams,
}

/// Passthrough che registra le chiamate ricevute
#[derive(Default)]
pub struct RecordingSegmenter {
    calls: Mutex<Vec<SegmentCall>>,
}

impl RecordingSegmenter {
    pub fn calls(&self) -> Vec<SegmentCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Segmenter for RecordingSegmenter {
    async fn segment(
        &self,
        image: DynamicImage,
        model: SegmentationModel,
        params: MattingParams,
    ) -> Result<DynamicImage> {
        self.calls.lock().unwrap().push(SegmentCall {
            model,
            dimensions: image.dimensions(),
            params,
        });
        Ok(DynamicImage::ImageRgba8(image.to_rgba8()))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub const BOUNDARY: &str = "sfondo-test-boundary";

/// Costruttore minimale di body multipart/form-data
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}
