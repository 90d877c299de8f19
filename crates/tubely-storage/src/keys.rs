//! Storage key derivation.
//!
//! Key format: `{category}/{name}.{ext}` for videos, `{name}.{ext}` for thumbnails.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use std::fmt;
use tubely_core::AspectCategory;
use uuid::Uuid;

const RANDOM_NAME_BYTES: usize = 32;

/// How the name component of a key is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStrategy {
    /// 32 random bytes as a URL-safe token; collisions are not checked.
    Random,
    /// The content ID, so a re-upload replaces the previous asset.
    ByIdentifier(Uuid),
}

/// A storage path made of an optional prefix segment, a name and an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    prefix: Option<String>,
    name: String,
    extension: String,
}

impl StorageKey {
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}/{}.{}", prefix, self.name, self.extension),
            None => write!(f, "{}.{}", self.name, self.extension),
        }
    }
}

/// Build the storage key for an asset.
///
/// `category` becomes the leading path segment when present. `extension` is
/// lower-cased and stripped of anything that is not ASCII alphanumeric.
pub fn derive_key(
    category: Option<AspectCategory>,
    extension: &str,
    strategy: NamingStrategy,
) -> StorageKey {
    let name = match strategy {
        NamingStrategy::Random => random_token(),
        NamingStrategy::ByIdentifier(id) => id.to_string(),
    };

    let mut extension: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if extension.is_empty() {
        extension = "bin".to_string();
    }

    StorageKey {
        prefix: category.map(|c| c.as_str().to_string()),
        name,
        extension,
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_NAME_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
