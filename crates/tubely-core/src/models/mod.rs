pub mod content;
pub mod media;

pub use content::{AssetField, ContentRecord};
pub use media::{AspectCategory, ProbeResult};
