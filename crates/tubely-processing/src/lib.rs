//! Tubely Processing Library
//!
//! Everything the video pipeline does between receiving bytes and publishing them:
//! staging uploads to scratch storage, probing stream geometry, classifying the
//! aspect ratio and remuxing for fast-start playback.

pub mod error;
pub mod traits;
pub mod upload;
pub mod video;

pub use error::{ProcessingError, ProcessingResult};
pub use traits::MediaToolkit;
pub use upload::{buffer_capped, StagedAsset, TempStager};
pub use video::{classify, FfmpegToolkit};
