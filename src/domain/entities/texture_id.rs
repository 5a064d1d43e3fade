//! Stable identifiers for cached texture files.

use sha2::{Digest, Sha256};

/// Identifier of a texture on disk.
/// Generated from a hash of the texture key, so the same URL always maps to
/// the same file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(String);

impl TextureId {
    /// Creates a `TextureId` from a texture key (usually a URL) by hashing it.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let result = hasher.finalize();
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TextureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_same_id() {
        let a = TextureId::from_key("http://textures.minecraft.net/texture/abc");
        let b = TextureId::from_key("http://textures.minecraft.net/texture/abc");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_different_keys_differ() {
        let a = TextureId::from_key("https://optifine.net/capes/Notch.png");
        let b = TextureId::from_key("https://optifine.net/capes/jeb_.png");
        assert_ne!(a, b);
    }
}
