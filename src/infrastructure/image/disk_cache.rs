//! Disk-based texture cache for persistence across restarts.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::RgbaImage;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, trace, warn};

use crate::domain::entities::TextureId;
use crate::domain::errors::{FetchError, FetchResult};

use super::codec;

/// Disk cache storing fetched textures as PNG files named by key hash.
///
/// Files are only ever overwritten with the image derived from the same key,
/// so concurrent writers are harmless.
#[derive(Debug)]
pub struct DiskTextureCache {
    cache_dir: PathBuf,
}

impl DiskTextureCache {
    /// Creates a new disk cache in the specified directory.
    ///
    /// # Errors
    /// Returns error if cache directory cannot be created.
    pub async fn new(cache_dir: PathBuf) -> FetchResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| FetchError::io(format!("Failed to create cache dir: {e}")))?;
        Ok(Self { cache_dir })
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path for a cached texture.
    #[must_use]
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.png", TextureId::from_key(key).as_str()))
    }

    /// Gets raw PNG bytes from disk, refreshing the file's modification time
    /// so the janitor keeps it.
    pub async fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.cache_path(key);
        let Ok(bytes) = fs::read(&path).await else {
            trace!(key, "Disk cache miss");
            return None;
        };
        debug!(key, path = %path.display(), "Reading cached texture");
        if let Err(e) = touch(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to refresh cache file time");
        }
        Some(bytes)
    }

    /// Loads and decodes a texture from disk.
    /// A file that no longer decodes is treated as a miss.
    pub async fn get(&self, key: &str) -> Option<RgbaImage> {
        let bytes = self.get_bytes(key).await?;

        let result = tokio::task::spawn_blocking(move || codec::decode(&bytes)).await;

        match result {
            Ok(Ok(img)) => Some(img),
            Ok(Err(e)) => {
                warn!(key, error = %e, "Failed to decode cached texture");
                None
            }
            Err(e) => {
                error!(key, error = %e, "Decode task panicked");
                None
            }
        }
    }

    /// Encodes `raster` as PNG and writes it to the cache.
    ///
    /// # Errors
    /// Returns error if encoding fails or the file cannot be written.
    pub async fn put(&self, key: &str, raster: &RgbaImage) -> FetchResult<()> {
        let raster = raster.clone();
        let png = tokio::task::spawn_blocking(move || codec::encode(&raster))
            .await
            .map_err(|e| FetchError::Task(format!("Encode task panicked: {e}")))??;
        self.put_bytes(key, &png).await
    }

    /// Stores raw bytes in the disk cache.
    ///
    /// # Errors
    /// Returns error if file cannot be created or written.
    pub async fn put_bytes(&self, key: &str, bytes: &[u8]) -> FetchResult<()> {
        let path = self.cache_path(key);

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| FetchError::io(format!("Failed to create cache file: {e}")))?;

        file.write_all(bytes)
            .await
            .map_err(|e| FetchError::io(format!("Failed to write cache file: {e}")))?;

        file.flush()
            .await
            .map_err(|e| FetchError::io(format!("Failed to flush cache file: {e}")))?;

        debug!(key, path = %path.display(), size = bytes.len(), "Stored texture in disk cache");
        Ok(())
    }

    /// Checks if a texture is cached.
    pub async fn contains(&self, key: &str) -> bool {
        fs::try_exists(self.cache_path(key)).await.unwrap_or(false)
    }
}

async fn touch(path: &Path) -> std::io::Result<()> {
    let file = fs::OpenOptions::new().write(true).open(path).await?;
    let file = file.into_std().await;
    tokio::task::spawn_blocking(move || file.set_modified(SystemTime::now()))
        .await
        .map_err(std::io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn create_test_cache() -> (DiskTextureCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = DiskTextureCache::new(temp_dir.path().join("images"))
            .await
            .unwrap();
        (cache, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (cache, _temp) = create_test_cache().await;
        let raster = RgbaImage::from_pixel(64, 32, image::Rgba([9, 8, 7, 255]));

        cache.put("http://example.com/cape", &raster).await.unwrap();

        assert!(cache.contains("http://example.com/cape").await);
        assert_eq!(cache.get("http://example.com/cape").await, Some(raster));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (cache, _temp) = create_test_cache().await;
        assert!(cache.get_bytes("nonexistent").await.is_none());
        assert!(cache.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_file_named_by_key_hash() {
        let (cache, _temp) = create_test_cache().await;
        let path = cache.cache_path("http://example.com/skin");

        assert_eq!(path.parent(), Some(cache.cache_dir()));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("{}.png", TextureId::from_key("http://example.com/skin")).as_str())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_miss() {
        let (cache, _temp) = create_test_cache().await;
        cache.put_bytes("broken", b"not a png").await.unwrap();

        assert!(cache.get_bytes("broken").await.is_some());
        assert!(cache.get("broken").await.is_none());
    }

    #[tokio::test]
    async fn test_hit_refreshes_modification_time() {
        let (cache, _temp) = create_test_cache().await;
        cache.put_bytes("key", b"data").await.unwrap();

        let path = cache.cache_path("key");
        let old = SystemTime::now() - Duration::from_secs(5 * 24 * 60 * 60);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(old)
            .unwrap();

        cache.get_bytes("key").await.unwrap();

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert!(modified > old + Duration::from_secs(24 * 60 * 60));
    }
}
