//! API constants

/// Media types accepted for thumbnails.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Media types accepted for videos.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

/// Room left above a file size cap for multipart boundaries, part headers and
/// any small fields sent alongside the file.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Path prefix under which locally stored assets are served.
pub const ASSETS_ROUTE: &str = "/assets";
