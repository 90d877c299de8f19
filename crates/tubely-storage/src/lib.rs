//! Tubely Storage Library
//!
//! Storage abstraction used by the upload pipelines to publish finished assets.
//! Videos go to a remote object store ([`S3Storage`]); thumbnails are written to a
//! locally served directory ([`LocalStorage`]).
//!
//! # Storage key format
//!
//! Keys are `{prefix}/{name}.{ext}` or `{name}.{ext}`, built by [`keys::derive_key`].
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-local")]
pub use factory::create_thumbnail_storage;
pub use factory::create_video_storage;
pub use keys::{derive_key, NamingStrategy, StorageKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
