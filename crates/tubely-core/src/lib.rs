//! Tubely Core Library
//!
//! Domain models, error types and configuration shared by every tubely crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ServiceConfig, ThumbnailNaming};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectCategory, AssetField, ContentRecord, ProbeResult};
pub use storage_types::StorageBackend;
