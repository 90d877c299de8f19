use crate::auth::BearerToken;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{
    missing_file_field, multipart_read_error, multipart_stream_error, parse_content_id,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use futures::TryStreamExt;
use std::sync::Arc;
use tubely_core::{AppError, AssetField, ContentRecord};

/// `POST /content/{id}/video`
///
/// Multipart form with the MP4 file in a field named `video`. Returns the updated
/// content record.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    bearer: BearerToken,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ContentRecord>, HttpAppError> {
    let content_id = parse_content_id(&id)?;
    let record = state.gate.authorize(content_id, bearer.as_deref()).await?;

    let mut multipart = multipart.map_err(|e| {
        AppError::InvalidInput(format!("Expected a multipart form: {}", e.body_text()))
    })?;
    let field_name = AssetField::Video.form_field();
    let limit = state.uploads.limits().video_max_bytes;

    while let Some(field) = multipart.next_field().await.map_err(multipart_read_error)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let declared_type = field.content_type().map(str::to_owned);
        let stream = field.map_err(move |e| multipart_stream_error(e, limit));
        let updated = state
            .uploads
            .upload_video(record, declared_type.as_deref(), stream)
            .await?;

        return Ok(Json(updated));
    }

    Err(missing_file_field(field_name).into())
}
