//! Domain entity definitions.

mod cape;
mod geometry;
mod provider;
mod skin;
mod texture_id;

pub use cape::{CAPE_HEIGHT, CAPE_WIDTH, Cape, cape_id_from_key};
pub use geometry::BodyGeometry;
pub use provider::{CapeProvider, EarsProvider, KeyKind, ProviderDescriptor, ResponseFormat};
pub use skin::{SKIN_WIDTH, Skin};
pub use texture_id::TextureId;
