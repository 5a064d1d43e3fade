//! Errors raised while fetching or decoding a texture.

use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur between a texture request and a decoded image.
///
/// These never reach callers of the cache engine: they stop at the fetch
/// boundary and are turned into the canonical failure value of the asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, timeout or non-2xx status.
    #[error("network error: {0}")]
    Network(String),
    /// Body is not a valid image or the provider response is malformed.
    #[error("decode error: {0}")]
    Decode(String),
    /// Disk read or write failure.
    #[error("io error: {0}")]
    Io(String),
    /// The provider has no asset for the requested key.
    #[error("not found: {0}")]
    NotFound(String),
    /// The worker running the fetch panicked or was aborted.
    #[error("fetch task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates io error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Creates not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Returns whether the error came from the remote side.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::NotFound(_))
    }
}

impl From<image::ImageError> for FetchError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        assert!(FetchError::network("timeout").is_remote());
        assert!(FetchError::not_found("no cape").is_remote());
        assert!(!FetchError::decode("bad png").is_remote());
        assert!(!FetchError::io("disk full").is_remote());
    }

    #[test]
    fn test_io_conversion() {
        let err: FetchError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, FetchError::Io(msg) if msg.contains("gone")));
    }
}
