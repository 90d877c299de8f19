//! Seam between the upload pipeline and the external media tools.

use crate::error::ProcessingResult;
use async_trait::async_trait;
use std::path::Path;
use tempfile::TempPath;
use tubely_core::ProbeResult;

/// External media tooling used by the video pipeline.
///
/// The production implementation shells out to ffprobe/ffmpeg; tests substitute
/// deterministic fakes.
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Width and height of the first video stream in `path`.
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult>;

    /// Rewrite `path` with its index moved to the front, without re-encoding.
    ///
    /// The returned file is deleted when the [`TempPath`] is dropped.
    async fn fast_start(&self, path: &Path) -> ProcessingResult<TempPath>;
}
