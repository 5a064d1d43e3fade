//! Infrastructure layer with external service adapters.

/// Bundled default skins and geometry.
pub mod assets;
/// Application configuration.
pub mod config;
/// Texture fetching, decoding and caching.
pub mod image;
/// Locally connected clients and their skin ids.
pub mod sessions;

pub use assets::DefaultAssets;
pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use image::{
    CacheStats, DiskJanitor, DiskTextureCache, FetchExecutor, HttpTextureSource,
    MemoryTextureCache, TextureLoader,
};
pub use sessions::InMemorySessionDirectory;
