//! Domain error types.

mod asset_error;
mod fetch_error;

pub use asset_error::AssetError;
pub use fetch_error::{FetchError, FetchResult};
