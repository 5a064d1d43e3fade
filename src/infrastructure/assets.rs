//! Built-in textures and geometry loaded once at start-up.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::domain::entities::{BodyGeometry, SKIN_WIDTH, Skin};
use crate::domain::errors::AssetError;

use super::image::codec;

/// Key of the classic default skin.
pub const STEVE_KEY: &str = "steve";
/// Key of the slim default skin.
pub const ALEX_KEY: &str = "alex";

const STEVE_FILE: &str = "skin_steve.png";
const ALEX_FILE: &str = "skin_alex.png";
const EARS_GEOMETRY_FILE: &str = "geometry.humanoid.ears.json";
const EARS_GEOMETRY_SLIM_FILE: &str = "geometry.humanoid.earsSlim.json";

/// Permanent skins and the ears geometry fragments.
///
/// The permanent skins never expire and are served without touching the cache.
#[derive(Debug, Clone)]
pub struct DefaultAssets {
    steve: Arc<Skin>,
    alex: Arc<Skin>,
    ears_geometry: String,
    ears_geometry_slim: String,
}

impl DefaultAssets {
    /// Builds the registry from already decoded RGBA buffers.
    #[must_use]
    pub fn new(
        steve_rgba: impl Into<Bytes>,
        alex_rgba: impl Into<Bytes>,
        ears_geometry: impl Into<String>,
        ears_geometry_slim: impl Into<String>,
    ) -> Self {
        Self {
            steve: Arc::new(Skin::permanent(STEVE_KEY, steve_rgba)),
            alex: Arc::new(Skin::permanent(ALEX_KEY, alex_rgba)),
            ears_geometry: ears_geometry.into(),
            ears_geometry_slim: ears_geometry_slim.into(),
        }
    }

    /// Loads the four bundled resources from `resource_dir`.
    ///
    /// # Errors
    /// Returns error if any resource is missing or a skin does not decode to
    /// a 64 pixel wide image.
    pub fn load(resource_dir: &Path) -> Result<Self, AssetError> {
        let steve = load_skin(resource_dir, STEVE_FILE)?;
        let alex = load_skin(resource_dir, ALEX_FILE)?;
        let ears = read_text(resource_dir, EARS_GEOMETRY_FILE)?;
        let ears_slim = read_text(resource_dir, EARS_GEOMETRY_SLIM_FILE)?;

        info!(dir = %resource_dir.display(), "Loaded default skin assets");
        Ok(Self::new(steve, alex, ears, ears_slim))
    }

    /// Returns the permanent skin stored under `key`.
    #[must_use]
    pub fn permanent_skin(&self, key: &str) -> Option<Arc<Skin>> {
        match key {
            STEVE_KEY => Some(Arc::clone(&self.steve)),
            ALEX_KEY => Some(Arc::clone(&self.alex)),
            _ => None,
        }
    }

    /// The skin used when nothing else is available.
    #[must_use]
    pub fn empty_skin(&self) -> Arc<Skin> {
        Arc::clone(&self.steve)
    }

    /// Humanoid geometry with ears.
    #[must_use]
    pub fn ears_geometry(&self, slim: bool) -> BodyGeometry {
        let data = if slim {
            &self.ears_geometry_slim
        } else {
            &self.ears_geometry
        };
        BodyGeometry::ears(slim, data.as_str())
    }
}

fn read(dir: &Path, name: &str) -> Result<Vec<u8>, AssetError> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|source| AssetError::Read { path, source })
}

fn read_text(dir: &Path, name: &str) -> Result<String, AssetError> {
    let bytes = read(dir, name)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn load_skin(dir: &Path, name: &str) -> Result<Vec<u8>, AssetError> {
    let bytes = read(dir, name)?;
    let raster = codec::decode(&bytes).map_err(|e| AssetError::InvalidImage {
        path: dir.join(name),
        message: e.to_string(),
    })?;
    if raster.width() != SKIN_WIDTH {
        return Err(AssetError::InvalidSkinLayout {
            name: name.to_string(),
            width: raster.width(),
            height: raster.height(),
        });
    }
    Ok(codec::to_rgba_buffer(raster))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Solid-colour assets for engine tests.
    pub fn assets() -> DefaultAssets {
        DefaultAssets::new(
            vec![1u8; 64 * 64 * 4],
            vec![2u8; 64 * 64 * 4],
            r#"{"format_version":"1.12.0"}"#,
            r#"{"format_version":"1.12.0","slim":true}"#,
        )
    }
}
