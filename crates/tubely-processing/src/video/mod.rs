//! Video probing, classification and remuxing.

pub mod aspect;
pub mod ffmpeg;
pub mod probe;

pub use aspect::classify;
pub use ffmpeg::FfmpegToolkit;
pub use probe::parse_probe_output;
