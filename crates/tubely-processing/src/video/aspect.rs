use tubely_core::AspectCategory;

const LANDSCAPE: f64 = 16.0 / 9.0;
const PORTRAIT: f64 = 9.0 / 16.0;
/// Relative tolerance when matching a ratio against a target.
const TOLERANCE: f64 = 0.01;

/// Bucket a width/height pair into an aspect category.
///
/// The ratio is compared as a real number, so encoder rounding such as
/// 854x480 still lands in the landscape bucket.
pub fn classify(width: u32, height: u32) -> AspectCategory {
    if width == 0 || height == 0 {
        return AspectCategory::Other;
    }
    let ratio = width as f64 / height as f64;

    if matches_ratio(ratio, LANDSCAPE) {
        AspectCategory::Landscape
    } else if matches_ratio(ratio, PORTRAIT) {
        AspectCategory::Portrait
    } else {
        AspectCategory::Other
    }
}

fn matches_ratio(ratio: f64, target: f64) -> bool {
    ((ratio - target) / target).abs() <= TOLERANCE
}
