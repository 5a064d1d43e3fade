//! Application services.

pub mod provider_fallback;
pub mod texture_service;

pub use provider_fallback::first_success;
pub use texture_service::{FetchMode, PROVIDER_TIMEOUT, TextureService, TextureServiceConfig};
