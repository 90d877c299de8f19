use super::jwt::IdentityValidator;
use std::sync::Arc;
use tubely_core::{AppError, ContentRecord};
use tubely_db::ContentRepository;
use uuid::Uuid;

/// Decides whether a caller may attach assets to a content record.
///
/// Checks run in a fixed order and nothing is written before they all pass:
/// the token must be valid (401), the record must exist (404) and the caller
/// must own it (403).
#[derive(Clone)]
pub struct UploadGate {
    identity: Arc<dyn IdentityValidator>,
    contents: Arc<dyn ContentRepository>,
}

impl UploadGate {
    pub fn new(identity: Arc<dyn IdentityValidator>, contents: Arc<dyn ContentRepository>) -> Self {
        Self { identity, contents }
    }

    /// Return the record the caller is allowed to modify.
    #[tracing::instrument(skip(self, bearer), fields(content.id = %content_id))]
    pub async fn authorize(
        &self,
        content_id: Uuid,
        bearer: Option<&str>,
    ) -> Result<ContentRecord, AppError> {
        let token = bearer
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Couldn't find JWT".to_string()))?;
        let caller = self.identity.validate(token).await?;

        let record = self
            .contents
            .get(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Couldn't find content".to_string()))?;

        if record.owner_id != caller {
            tracing::warn!(
                user.id = %caller,
                owner.id = %record.owner_id,
                "Upload attempted by a user who does not own the content"
            );
            return Err(AppError::Forbidden(
                "You are not the owner of this content".to_string(),
            ));
        }

        Ok(record)
    }
}
