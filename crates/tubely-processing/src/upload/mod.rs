//! Moving inbound upload bytes somewhere the pipeline can work on them.

mod staging;

pub use staging::{buffer_capped, StagedAsset, TempStager};
