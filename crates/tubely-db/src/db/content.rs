use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::{AppError, AssetField, ContentRecord};
use uuid::Uuid;

/// Read/write boundary of the metadata store used by the upload pipelines.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>, AppError>;

    /// Set a single URL column of record `id` and return the stored row.
    ///
    /// Only `field` and `updated_at` are written, so concurrent uploads of the
    /// other asset kind are never reverted.
    async fn update_url(
        &self,
        id: Uuid,
        field: AssetField,
        url: &str,
    ) -> Result<ContentRecord, AppError>;
}

/// Postgres-backed content repository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "content", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, ContentRecord>("SELECT * FROM content WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "content", db.operation = "update", db.record_id = %id, db.column = field.column()))]
    async fn update_url(
        &self,
        id: Uuid,
        field: AssetField,
        url: &str,
    ) -> Result<ContentRecord, AppError> {
        // column names come from a closed enum
        let query = format!(
            "UPDATE content SET {} = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            field.column()
        );
        let row = sqlx::query_as::<Postgres, ContentRecord>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Content {} not found", id)))
    }
}
