//! Domain layer with core texture entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{BodyGeometry, Cape, CapeProvider, EarsProvider, Skin};
pub use errors::{FetchError, FetchResult};
pub use ports::{SessionDirectory, TextureSource};
