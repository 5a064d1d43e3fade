//! Skin texture entity.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Width in pixels of every skin handled by the cache.
pub const SKIN_WIDTH: u32 = 64;

/// A player's skin texture as raw RGBA pixels, 64 pixels wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skin {
    owner_id: Uuid,
    texture_key: String,
    pixel_data: Bytes,
    fetched_at: Option<DateTime<Utc>>,
    was_refreshed: bool,
    has_ears_overlay: bool,
}

impl Skin {
    /// Creates a skin fetched just now.
    #[must_use]
    pub fn new(owner_id: Uuid, texture_key: impl Into<String>, pixel_data: impl Into<Bytes>) -> Self {
        Self {
            owner_id,
            texture_key: texture_key.into(),
            pixel_data: pixel_data.into(),
            fetched_at: Some(Utc::now()),
            was_refreshed: false,
            has_ears_overlay: false,
        }
    }

    /// Creates a built-in skin with no owner and no fetch time.
    #[must_use]
    pub fn permanent(texture_key: impl Into<String>, pixel_data: impl Into<Bytes>) -> Self {
        Self {
            owner_id: Uuid::nil(),
            texture_key: texture_key.into(),
            pixel_data: pixel_data.into(),
            fetched_at: None,
            was_refreshed: false,
            has_ears_overlay: false,
        }
    }

    /// Marks the skin as refreshed by a completed background fetch.
    #[must_use]
    pub fn refreshed(mut self) -> Self {
        self.was_refreshed = true;
        self
    }

    /// Replaces the pixels with an ears-composited version.
    #[must_use]
    pub fn with_ears(&self, pixel_data: impl Into<Bytes>) -> Self {
        Self {
            owner_id: self.owner_id,
            texture_key: self.texture_key.clone(),
            pixel_data: pixel_data.into(),
            fetched_at: Some(Utc::now()),
            was_refreshed: true,
            has_ears_overlay: true,
        }
    }

    #[must_use]
    pub const fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    #[must_use]
    pub fn texture_key(&self) -> &str {
        &self.texture_key
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
    pub const fn was_refreshed(&self) -> bool {
        self.was_refreshed
    }

    #[must_use]
    pub const fn has_ears_overlay(&self) -> bool {
        self.has_ears_overlay
    }

    /// Height in pixels implied by the buffer length.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u32 {
        (self.pixel_data.len() / 4 / SKIN_WIDTH as usize) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_from_buffer() {
        let skin = Skin::new(Uuid::new_v4(), "key", vec![0u8; 64 * 32 * 4]);
        assert_eq!(skin.height(), 32);
    }

    #[test]
    fn test_with_ears_keeps_identity() {
        let owner = Uuid::new_v4();
        let skin = Skin::new(owner, "http://example.com/skin", vec![0u8; 64 * 64 * 4]);
        let eared = skin.with_ears(vec![1u8; 64 * 64 * 4]);

        assert_eq!(eared.owner_id(), owner);
        assert_eq!(eared.texture_key(), "http://example.com/skin");
        assert!(eared.has_ears_overlay());
        assert!(eared.was_refreshed());
        assert!(!skin.has_ears_overlay());
    }

    #[test]
    fn test_permanent_has_no_fetch_time() {
        let skin = Skin::permanent("steve", vec![0u8; 16]);
        assert!(skin.fetched_at().is_none());
        assert!(skin.owner_id().is_nil());
    }
}
