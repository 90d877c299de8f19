//! Thumbnail and video upload pipelines
//!
//! Both pipelines run validation first, then move the bytes to their final
//! location, and write the content record last. A failure at any step stops the
//! run, and the record is left as it was unless the final write succeeded.
//!
//! Scratch files belong to the run that created them and are removed when it
//! ends, whether it succeeds, fails or is cancelled.

use crate::constants::{THUMBNAIL_CONTENT_TYPES, VIDEO_CONTENT_TYPES};
use crate::services::metadata::MetadataUpdater;
use crate::utils::upload::{extension_for, validate_content_type};
use bytes::Bytes;
use futures::Stream;
use std::sync::Arc;
use tubely_core::{AppError, AssetField, ContentRecord, ThumbnailNaming};
use tubely_processing::{buffer_capped, classify, MediaToolkit, ProcessingError, TempStager};
use tubely_storage::{derive_key, NamingStrategy, Storage, StorageError, StorageKey};

/// Per-asset size caps, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub thumbnail_max_bytes: u64,
    pub video_max_bytes: u64,
}

/// Runs the upload pipelines for records that already passed the upload gate.
#[derive(Clone)]
pub struct MediaUploadService {
    stager: TempStager,
    toolkit: Arc<dyn MediaToolkit>,
    video_storage: Arc<dyn Storage>,
    thumbnail_storage: Arc<dyn Storage>,
    updater: MetadataUpdater,
    limits: UploadLimits,
    thumbnail_naming: ThumbnailNaming,
}

impl MediaUploadService {
    pub fn new(
        stager: TempStager,
        toolkit: Arc<dyn MediaToolkit>,
        video_storage: Arc<dyn Storage>,
        thumbnail_storage: Arc<dyn Storage>,
        updater: MetadataUpdater,
        limits: UploadLimits,
        thumbnail_naming: ThumbnailNaming,
    ) -> Self {
        Self {
            stager,
            toolkit,
            video_storage,
            thumbnail_storage,
            updater,
            limits,
            thumbnail_naming,
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Buffer a thumbnail, write it to the locally served directory and point the
    /// record's thumbnail URL at it.
    #[tracing::instrument(skip(self, record, stream), fields(content.id = %record.id))]
    pub async fn upload_thumbnail<S>(
        &self,
        record: ContentRecord,
        declared_type: Option<&str>,
        stream: S,
    ) -> Result<ContentRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let media_type = validate_content_type(declared_type, THUMBNAIL_CONTENT_TYPES)?;
        let data = buffer_capped(stream, self.limits.thumbnail_max_bytes).await?;

        let strategy = match self.thumbnail_naming {
            ThumbnailNaming::Random => NamingStrategy::Random,
            ThumbnailNaming::ById => NamingStrategy::ByIdentifier(record.id),
        };
        let key = derive_key(None, extension_for(&media_type), strategy);
        let size_bytes = data.len();

        let url = self
            .thumbnail_storage
            .upload_with_key(&key.to_string(), data, &media_type)
            .await
            .map_err(local_write_error)?;

        tracing::info!(
            storage.key = %key,
            media_type = %media_type,
            size_bytes,
            "Thumbnail written"
        );

        self.persist(&record, AssetField::Thumbnail, url, &key).await
    }

    /// Stage a video, read its geometry, remux it for fast start, publish it under
    /// its aspect category and point the record's video URL at it.
    #[tracing::instrument(skip(self, record, stream), fields(content.id = %record.id))]
    pub async fn upload_video<S>(
        &self,
        record: ContentRecord,
        declared_type: Option<&str>,
        stream: S,
    ) -> Result<ContentRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let media_type = validate_content_type(declared_type, VIDEO_CONTENT_TYPES)?;
        let extension = extension_for(&media_type);

        let staged = self
            .stager
            .stage(stream, self.limits.video_max_bytes, extension)
            .await?;

        let geometry = self.toolkit.probe(staged.path()).await?;
        let category = classify(geometry.width, geometry.height);
        let key = derive_key(Some(category), extension, NamingStrategy::Random);

        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            category = %category,
            staged_bytes = staged.size_bytes(),
            "Classified video"
        );

        let remuxed = self.toolkit.fast_start(staged.path()).await?;
        drop(staged);

        let file = tokio::fs::File::open(&remuxed).await?;
        let length = file.metadata().await?.len();

        let url = self
            .video_storage
            .upload_stream(&key.to_string(), &media_type, Some(length), Box::pin(file))
            .await
            .map_err(|e| AppError::Publish(e.to_string()))?;
        drop(remuxed);

        tracing::info!(
            storage.key = %key,
            category = %category,
            size_bytes = length,
            backend = %self.video_storage.backend_type(),
            "Video published"
        );

        self.persist(&record, AssetField::Video, url, &key).await
    }

    async fn persist(
        &self,
        record: &ContentRecord,
        field: AssetField,
        url: String,
        key: &StorageKey,
    ) -> Result<ContentRecord, AppError> {
        match self.updater.update(record, field, url).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                // The asset stays published; nothing references it until reconciled.
                tracing::error!(
                    error = %e,
                    storage.key = %key,
                    field = field.column(),
                    "Asset published but content record not updated"
                );
                Err(e)
            }
        }
    }
}

fn local_write_error(err: StorageError) -> AppError {
    match err {
        StorageError::IoError(e) => AppError::Io(e.to_string()),
        StorageError::InvalidKey(msg) | StorageError::ConfigError(msg) => AppError::Internal(msg),
        other => AppError::Io(other.to_string()),
    }
}
