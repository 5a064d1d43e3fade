//! Cape texture entity.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Cape canvas width in pixels.
pub const CAPE_WIDTH: u32 = 64;
/// Cape canvas height in pixels.
pub const CAPE_HEIGHT: u32 = 32;

const EMPTY_CAPE_ID: &str = "no-cape";

/// A cape texture as raw RGBA pixels on a 64x32 canvas.
///
/// A failed cape always carries the empty placeholder buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cape {
    key: String,
    cape_id: String,
    pixel_data: Bytes,
    fetched_at: Option<DateTime<Utc>>,
    failed: bool,
}

impl Cape {
    /// The canonical empty cape.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            key: String::new(),
            cape_id: EMPTY_CAPE_ID.to_string(),
            pixel_data: Bytes::new(),
            fetched_at: None,
            failed: true,
        }
    }

    /// A successfully fetched cape. The id is the last path segment of the key.
    #[must_use]
    pub fn fetched(key: impl Into<String>, pixel_data: impl Into<Bytes>) -> Self {
        let key = key.into();
        let cape_id = cape_id_from_key(&key).to_string();
        Self::with_id(key, cape_id, pixel_data)
    }

    /// A cape with an explicit id, used for locally supplied capes.
    #[must_use]
    pub fn with_id(
        key: impl Into<String>,
        cape_id: impl Into<String>,
        pixel_data: impl Into<Bytes>,
    ) -> Self {
        Self {
            key: key.into(),
            cape_id: cape_id.into(),
            pixel_data: pixel_data.into(),
            fetched_at: Some(Utc::now()),
            failed: false,
        }
    }

    /// A cape whose fetch produced no data.
    #[must_use]
    pub fn failed(key: impl Into<String>) -> Self {
        let key = key.into();
        let cape_id = cape_id_from_key(&key).to_string();
        Self {
            key,
            cape_id,
            pixel_data: Bytes::new(),
            fetched_at: Some(Utc::now()),
            failed: true,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn cape_id(&self) -> &str {
        &self.cape_id
    }

    #[must_use]
    pub const fn pixel_data(&self) -> &Bytes {
        &self.pixel_data
    }

    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failed
    }
}

/// Last `/`-separated segment of a cape URL.
#[must_use]
pub fn cape_id_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cape_id_from_url() {
        let cape = Cape::fetched(
            "http://textures.minecraft.net/texture/953cac8b779fe41383e675ee2b86071a71658f2180f56fbce8aa315ea70e2ed6",
            vec![0u8; 64 * 32 * 4],
        );
        assert_eq!(
            cape.cape_id(),
            "953cac8b779fe41383e675ee2b86071a71658f2180f56fbce8aa315ea70e2ed6"
        );
        assert!(!cape.is_failed());
    }

    #[test]
    fn test_failed_cape_uses_placeholder() {
        let cape = Cape::failed("https://optifine.net/capes/Notch.png");
        assert!(cape.is_failed());
        assert!(cape.pixel_data().is_empty());
        assert_eq!(cape.cape_id(), "Notch.png");
    }

    #[test]
    fn test_empty_cape() {
        let cape = Cape::empty();
        assert!(cape.is_failed());
        assert_eq!(cape.cape_id(), "no-cape");
        assert!(cape.key().is_empty());
    }
}
