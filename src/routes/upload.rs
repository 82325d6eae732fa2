//! Lettura dei form multipart di upload

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::error::{AppError, Result};

/// File caricato con il nome dichiarato dal client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub data: Bytes,
}

/// Campi riconosciuti dagli endpoint di upload; i campi sconosciuti sono ignorati
#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<UploadedFile>,
    pub background_image: Option<UploadedFile>,
    pub background_type: Option<String>,
    pub background_value: Option<String>,
    pub model_used: Option<String>,
}

impl UploadForm {
    pub fn background_type(&self) -> &str {
        self.background_type.as_deref().unwrap_or("color")
    }

    pub fn background_value(&self) -> &str {
        self.background_value.as_deref().unwrap_or("#FFFFFF")
    }

    pub fn require_image(&self) -> Result<&UploadedFile> {
        self.image
            .as_ref()
            .ok_or_else(|| AppError::MissingField("image".to_string()))
    }
}

fn multipart_error(e: MultipartError, max_file_size_mb: u64) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(max_file_size_mb)
    } else {
        AppError::BadRequest(e.body_text())
    }
}

pub async fn read_upload_form(
    multipart: std::result::Result<Multipart, MultipartRejection>,
    max_file_size_mb: u64,
) -> Result<UploadForm> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size_mb))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_file_size_mb))?;

        match name.as_str() {
            "image" => form.image = Some(UploadedFile { filename, data }),
            "background_image" => {
                form.background_image = Some(UploadedFile { filename, data })
            }
            "background_type" => form.background_type = Some(text_field(&name, &data)?),
            "background_value" => form.background_value = Some(text_field(&name, &data)?),
            "model_used" => form.model_used = Some(text_field(&name, &data)?),
            _ => tracing::debug!("Campo multipart ignorato: {}", name),
        }
    }

    Ok(form)
}

fn text_field(name: &str, data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map(|s| s.trim().to_string())
        .map_err(|_| AppError::BadRequest(format!("Campo {} non è testo UTF-8", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MultipartBody;
    use axum::body::Body;
    use axum::extract::DefaultBodyLimit;
    use axum::http::{header, Method, Request};
    use axum::{routing::post, Router};
    use tower::ServiceExt;

    /// Router minimo: file da 100 MB ammessi ma body limitato a 1 KiB
    fn app() -> Router {
        Router::new()
            .route(
                "/upload",
                post(
                    |multipart: std::result::Result<Multipart, MultipartRejection>| async move {
                        let form = read_upload_form(multipart, 100).await?;
                        Ok::<_, AppError>(form.require_image()?.data.len().to_string())
                    },
                ),
            )
            .layer(DefaultBodyLimit::max(1024))
    }

    fn upload(data: &[u8]) -> Request<Body> {
        let body = MultipartBody::new()
            .text("background_type", "color")
            .file("image", "photo.png", "image/png", data);
        Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(header::CONTENT_TYPE, MultipartBody::content_type())
            .body(Body::from(body.build()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_small_body_read() {
        let response = app().oneshot(upload(&[7u8; 100])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"100");
    }

    #[tokio::test]
    async fn test_body_limit_is_file_too_large() {
        let response = app().oneshot(upload(&[7u8; 4096])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "File troppo grande (massimo 100 MB)");
        assert_eq!(json["status"], 400);
    }

    #[tokio::test]
    async fn test_missing_multipart_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
