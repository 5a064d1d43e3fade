//! Texture loading pipeline.
//!
//! Implements the fetch side of the cache: Disk -> Network -> Decode, with
//! freshly downloaded textures written back to disk.

use std::sync::Arc;

use bytes::Bytes;
use image::RgbaImage;
use tracing::{debug, error};

use crate::domain::entities::{CapeProvider, ResponseFormat, SKIN_WIDTH};
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::ports::TextureSource;

use super::codec;
use super::disk_cache::DiskTextureCache;

/// Kind of texture being requested, which decides post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Skin, kept at its original size.
    Skin,
    /// Cape from the given provider, normalized to the 64x32 canvas.
    Cape(CapeProvider),
}

impl TextureKind {
    fn format(self) -> ResponseFormat {
        match self {
            Self::Skin => ResponseFormat::Image,
            Self::Cape(provider) => provider.format(),
        }
    }

    /// Skins must be exactly 64 pixels wide; capes are resized later.
    fn check_layout(self, image: &RgbaImage) -> FetchResult<()> {
        match self {
            Self::Skin if image.width() != SKIN_WIDTH => Err(FetchError::decode(format!(
                "skin is {}x{}, expected width {SKIN_WIDTH}",
                image.width(),
                image.height()
            ))),
            _ => Ok(()),
        }
    }
}

/// Fetches and decodes textures, consulting the disk cache first.
pub struct TextureLoader {
    source: Arc<dyn TextureSource>,
    disk_cache: Option<Arc<DiskTextureCache>>,
}

impl std::fmt::Debug for TextureLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureLoader")
            .field("disk_cache", &self.disk_cache)
            .finish_non_exhaustive()
    }
}

impl TextureLoader {
    /// Creates a loader. Without a disk cache every request goes to the network.
    #[must_use]
    pub fn new(source: Arc<dyn TextureSource>, disk_cache: Option<Arc<DiskTextureCache>>) -> Self {
        Self { source, disk_cache }
    }

    /// Loads the texture at `url` as an RGBA surface.
    ///
    /// # Errors
    /// Returns error if the texture cannot be downloaded or decoded.
    pub async fn request_image(&self, url: &str, kind: TextureKind) -> FetchResult<RgbaImage> {
        let cached = match &self.disk_cache {
            Some(disk) => disk.get(url).await,
            None => None,
        };

        let (image, from_disk) = match cached {
            Some(image) => (image, true),
            None => (self.download(url, kind.format()).await?, false),
        };
        kind.check_layout(&image)?;

        if !from_disk {
            debug!(url, "Downloaded texture");
            if let Some(disk) = &self.disk_cache
                && let Err(e) = disk.put(url, &image).await
            {
                error!(url, error = %e, "Failed to write cached texture");
            }
        }

        match kind {
            TextureKind::Skin => Ok(image),
            TextureKind::Cape(_) => Ok(codec::prepare_cape(image)),
        }
    }

    /// Downloads an overlay texture straight from the network, bypassing the
    /// disk cache.
    ///
    /// # Errors
    /// Returns error if the texture cannot be downloaded or decoded.
    pub async fn request_overlay(&self, url: &str) -> FetchResult<RgbaImage> {
        self.download(url, ResponseFormat::Image).await
    }

    async fn download(&self, url: &str, format: ResponseFormat) -> FetchResult<RgbaImage> {
        let bytes = self.source.fetch(url, format).await?;
        decode_off_thread(bytes).await
    }
}

async fn decode_off_thread(bytes: Bytes) -> FetchResult<RgbaImage> {
    tokio::task::spawn_blocking(move || codec::decode(&bytes))
        .await
        .map_err(|e| FetchError::Task(format!("Decode task panicked: {e}")))?
}
