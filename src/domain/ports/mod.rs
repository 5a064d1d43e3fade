//! Port definitions for texture sources and session lookup.

mod session_port;
mod texture_source_port;

pub use session_port::SessionDirectory;
pub use texture_source_port::TextureSource;

#[cfg(test)]
pub mod mocks {
    pub use super::session_port::MockSessionDirectory;
    pub use super::texture_source_port::mock::MockTextureSource;
}
