use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// A content record owned by the metadata store.
///
/// The upload pipelines only read it and overwrite one of the URL fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct ContentRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn new(owner_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: None,
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point `field` at `url`, leaving the other URL field alone.
    pub fn set_url(&mut self, field: AssetField, url: String) {
        match field {
            AssetField::Thumbnail => self.thumbnail_url = Some(url),
            AssetField::Video => self.video_url = Some(url),
        }
    }
}

/// Which URL column of a [`ContentRecord`] an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetField {
    Thumbnail,
    Video,
}

impl AssetField {
    /// Multipart field name carrying the upload.
    pub fn form_field(&self) -> &'static str {
        match self {
            AssetField::Thumbnail => "thumbnail",
            AssetField::Video => "video",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            AssetField::Thumbnail => "thumbnail_url",
            AssetField::Video => "video_url",
        }
    }
}
