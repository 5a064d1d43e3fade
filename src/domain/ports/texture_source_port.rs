//! Port definition for downloading texture bytes.

use bytes::Bytes;

use crate::domain::entities::ResponseFormat;
use crate::domain::errors::FetchResult;

/// Port for fetching encoded texture images from a remote source.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait TextureSource: Send + Sync {
    /// Downloads the texture at `url` and returns the encoded image bytes,
    /// unwrapping provider envelopes according to `format`.
    async fn fetch(&self, url: &str, format: ResponseFormat) -> FetchResult<Bytes>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::domain::errors::FetchError;

    /// Scripted texture source that records every request.
    /// Unknown URLs answer with `NotFound`.
    #[derive(Default)]
    pub struct MockTextureSource {
        responses: Mutex<HashMap<String, FetchResult<Bytes>>>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl MockTextureSource {
        /// Creates a source with no scripted responses.
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays every response, keeping fetches in flight for a while.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Answers `url` with `body`.
        pub fn with_response(self, url: &str, body: impl Into<Bytes>) -> Self {
            self.responses
                .lock()
                .insert(url.to_string(), Ok(body.into()));
            self
        }

        /// Answers `url` with `error`.
        pub fn with_error(self, url: &str, error: FetchError) -> Self {
            self.responses.lock().insert(url.to_string(), Err(error));
            self
        }

        /// Number of fetches performed for any URL.
        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        /// Number of fetches performed for `url`.
        pub fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().iter().filter(|u| *u == url).count()
        }

        /// Requested URLs in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl TextureSource for MockTextureSource {
        async fn fetch(&self, url: &str, _format: ResponseFormat) -> FetchResult<Bytes> {
            self.calls.lock().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::not_found(url)))
        }
    }
}
