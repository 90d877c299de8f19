//! Upload pipelines and the metadata write that completes them.

pub mod metadata;
pub mod upload;

pub use metadata::MetadataUpdater;
pub use upload::{MediaUploadService, UploadLimits};
