use std::sync::Arc;
use tubely_core::{AppError, AssetField, ContentRecord};
use tubely_db::ContentRepository;

/// Records a published asset URL on its content record.
///
/// This is the final step of both pipelines; any failure of the store is
/// reported as `Persist` regardless of its cause.
#[derive(Clone)]
pub struct MetadataUpdater {
    contents: Arc<dyn ContentRepository>,
}

impl MetadataUpdater {
    pub fn new(contents: Arc<dyn ContentRepository>) -> Self {
        Self { contents }
    }

    /// Set `field` of `record` to `url` and return the stored record.
    ///
    /// Only the named field is written; `record` may be a stale snapshot.
    #[tracing::instrument(skip(self, record), fields(content.id = %record.id, field = ?field))]
    pub async fn update(
        &self,
        record: &ContentRecord,
        field: AssetField,
        url: String,
    ) -> Result<ContentRecord, AppError> {
        self.contents
            .update_url(record.id, field, &url)
            .await
            .map_err(|e| AppError::Persist(e.to_string()))
    }
}
