//! skincache - player skin and cape resolution with a two-tier cache.
//!
//! Textures are resolved from permanent built-in assets, an in-memory cache
//! with a sliding expiry, an optional disk cache and finally the network.
//! Concurrent requests for the same texture share a single fetch.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the cache engine, use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "skincache";
