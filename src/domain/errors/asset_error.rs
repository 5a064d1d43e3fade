//! Start-up resource loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a bundled resource. Fatal at start-up.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AssetError {
    #[error("failed to read resource {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resource {path} is not a valid image: {message}")]
    InvalidImage { path: PathBuf, message: String },

    #[error("resource {name} is {width}x{height}, expected a 64 pixel wide skin")]
    InvalidSkinLayout {
        name: String,
        width: u32,
        height: u32,
    },
}
