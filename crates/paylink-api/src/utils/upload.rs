//! Multipart parsing for the upload form

use axum::extract::Multipart;
use paylink_core::AppError;
use paylink_services::{UploadFile, UploadRequest};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Normalize MIME type by stripping parameters (e.g. "text/plain; charset=utf-8" -> "text/plain").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_lowercase()
}

/// Read the upload form into an `UploadRequest`.
///
/// Every field named `file` or `files` is a file; `title`, `description`,
/// `price`, `currency` and `text_content` are text. Unknown fields are
/// skipped. Value checks happen in the upload service.
pub async fn extract_upload_request(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" | "files" => {
                let name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = normalize_mime_type(field.content_type().unwrap_or_default());
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                request.files.push(UploadFile {
                    name,
                    content_type,
                    data,
                });
            }
            "title" | "description" | "price" | "currency" | "text_content" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
                })?;
                match field_name.as_str() {
                    "title" => request.title = value,
                    "description" => request.description = value,
                    "price" => request.price = value,
                    "currency" => request.currency = value,
                    _ => request.text_content = Some(value),
                }
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_parameters_are_dropped() {
        assert_eq!(normalize_mime_type("Text/Plain; charset=utf-8"), "text/plain");
        assert_eq!(normalize_mime_type("image/png"), "image/png");
        assert_eq!(normalize_mime_type(""), DEFAULT_CONTENT_TYPE);
    }
}
