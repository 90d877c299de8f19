use super::content::ContentRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::{AppError, AssetField, ContentRecord};
use uuid::Uuid;

/// Process-local content repository
///
/// Backs local development without Postgres and the HTTP integration tests.
/// Updates can be switched to fail to exercise persistence errors.
#[derive(Clone, Default)]
pub struct InMemoryContentRepository {
    records: Arc<RwLock<HashMap<Uuid, ContentRecord>>>,
    fail_updates: Arc<AtomicBool>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: ContentRecord) {
        self.records.write().await.insert(record.id, record);
    }

    /// Make every subsequent `update_url` fail (or succeed again).
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update_url(
        &self,
        id: Uuid,
        field: AssetField,
        url: &str,
    ) -> Result<ContentRecord, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "content store rejected the update".to_string(),
            ));
        }

        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))?;

        stored.set_url(field, url.to_string());
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}
