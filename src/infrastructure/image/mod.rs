//! Texture image infrastructure.
//!
//! This module provides:
//! - RGBA codec and compositing
//! - Memory caching with a sliding expiry window
//! - Disk caching for persistence, plus the janitor that expires it
//! - HTTP texture source
//! - Bounded fetch executor and the loading pipeline

pub mod codec;
pub mod disk_cache;
pub mod executor;
pub mod http_source;
pub mod janitor;
pub mod loader;
pub mod memory_cache;

pub use disk_cache::DiskTextureCache;
pub use executor::{FetchExecutor, Pending, await_with_default, deferred, resolved};
pub use http_source::HttpTextureSource;
pub use janitor::{DiskJanitor, SweepReport};
pub use loader::{TextureKind, TextureLoader};
pub use memory_cache::{CacheStats, MemoryTextureCache};
