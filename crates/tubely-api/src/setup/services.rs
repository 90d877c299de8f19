//! Service initialization and application state setup

use crate::auth::JwtIdentityValidator;
use crate::state::{AppDependencies, AppState};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::PgContentRepository;
use tubely_processing::FfmpegToolkit;
use tubely_storage::{create_thumbnail_storage, create_video_storage};

/// Build the production collaborators and the application state from them
pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(config.scratch_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create scratch directory {}",
                config.scratch_dir().display()
            )
        })?;

    let video_storage = create_video_storage(config)
        .await
        .context("Failed to initialize video storage")?;
    let thumbnail_storage = create_thumbnail_storage(config)
        .await
        .context("Failed to initialize thumbnail storage")?;

    let toolkit = FfmpegToolkit::new(
        config.ffprobe_path().to_string(),
        config.ffmpeg_path().to_string(),
    )?;

    tracing::info!(
        video_backend = %video_storage.backend_type(),
        assets_root = %config.assets_root().display(),
        scratch_dir = %config.scratch_dir().display(),
        "Storage initialized"
    );

    let deps = AppDependencies {
        identity: Arc::new(JwtIdentityValidator::new(config.jwt_secret())),
        contents: Arc::new(PgContentRepository::new(pool)),
        toolkit: Arc::new(toolkit),
        video_storage,
        thumbnail_storage,
    };

    Ok(Arc::new(AppState::new(config, deps)))
}
