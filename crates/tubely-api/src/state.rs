//! Application state shared by all handlers.

use crate::auth::{IdentityValidator, UploadGate};
use crate::services::{MediaUploadService, MetadataUpdater, UploadLimits};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::ContentRepository;
use tubely_processing::{MediaToolkit, TempStager};
use tubely_storage::Storage;

/// Collaborators the upload endpoints are built from.
///
/// Production wiring lives in `setup::services`; tests supply fakes here.
pub struct AppDependencies {
    pub identity: Arc<dyn IdentityValidator>,
    pub contents: Arc<dyn ContentRepository>,
    pub toolkit: Arc<dyn MediaToolkit>,
    pub video_storage: Arc<dyn Storage>,
    pub thumbnail_storage: Arc<dyn Storage>,
}

#[derive(Clone)]
pub struct AppState {
    pub gate: UploadGate,
    pub uploads: MediaUploadService,
}

impl AppState {
    pub fn new(config: &Config, deps: AppDependencies) -> Self {
        let gate = UploadGate::new(deps.identity, deps.contents.clone());
        let limits = UploadLimits {
            thumbnail_max_bytes: config.max_thumbnail_size_bytes(),
            video_max_bytes: config.max_video_size_bytes(),
        };
        let uploads = MediaUploadService::new(
            TempStager::new(config.scratch_dir()),
            deps.toolkit,
            deps.video_storage,
            deps.thumbnail_storage,
            MetadataUpdater::new(deps.contents),
            limits,
            config.thumbnail_naming(),
        );

        Self { gate, uploads }
    }
}
