//! Common utilities for file upload handlers

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use tubely_core::AppError;
use tubely_processing::ProcessingError;
use uuid::Uuid;

/// Parse the content ID from the request path.
pub fn parse_content_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid ID".to_string()))
}

/// Failure to read the next part of a multipart body.
pub fn multipart_read_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload limit".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Map a failure while streaming a file part to the pipeline's error type.
///
/// Bodies cut off by the request size limit surface as `PayloadTooLarge`; any other
/// read failure is a malformed request.
pub fn multipart_stream_error(err: MultipartError, size_limit: u64) -> ProcessingError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProcessingError::PayloadTooLarge { limit: size_limit }
    } else {
        ProcessingError::Stream(err.body_text())
    }
}

/// The form had no part under the expected field name.
pub fn missing_file_field(name: &str) -> AppError {
    AppError::InvalidInput(format!(
        "No {} file provided; send it in a form field named '{}'",
        name, name
    ))
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Check the declared media type of an upload against an allow-list and return
/// it normalized. Compares the bare MIME type only, so parameters cannot be used
/// to slip past the list.
pub fn validate_content_type(
    declared: Option<&str>,
    allowed_types: &[&str],
) -> Result<String, AppError> {
    let declared = declared
        .map(normalize_mime_type)
        .filter(|ct| !ct.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing Content-Type for file".to_string()))?;

    match declared.split_once('/') {
        Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() => {}
        _ => {
            return Err(AppError::InvalidInput(format!(
                "Invalid Content-Type: {}",
                declared
            )))
        }
    }

    if !allowed_types.contains(&declared.as_str()) {
        return Err(AppError::UnsupportedMediaType(declared));
    }

    Ok(declared)
}

/// File extension for a validated media type: its subtype ("image/png" -> "png").
pub fn extension_for(media_type: &str) -> &str {
    media_type
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or(media_type)
}
