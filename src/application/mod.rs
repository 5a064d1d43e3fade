//! Application layer with the cache engine, use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Texture cache engine and provider fallback.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{PlayerAppearance, SkinRequest};
pub use services::{FetchMode, TextureService, TextureServiceConfig};
pub use use_cases::RequestSkinAndCapeUseCase;
