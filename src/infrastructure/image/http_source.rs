//! HTTP texture source backed by `reqwest`.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use tracing::trace;

use crate::domain::entities::ResponseFormat;
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::ports::TextureSource;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Downloads textures over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTextureSource {
    client: reqwest::Client,
}

impl HttpTextureSource {
    /// Creates a source sending `user_agent` with every request.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(user_agent: &str, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Downloads the body at `url`.
    async fn download(&self, url: &str) -> FetchResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(format!("Request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::not_found(url));
        }
        if !status.is_success() {
            return Err(FetchError::network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::network(format!("Failed to read body: {e}")))
    }
}

#[async_trait::async_trait]
impl TextureSource for HttpTextureSource {
    async fn fetch(&self, url: &str, format: ResponseFormat) -> FetchResult<Bytes> {
        trace!(url, ?format, "Downloading texture");
        let body = self.download(url).await?;
        match format {
            ResponseFormat::Image => Ok(body),
            ResponseFormat::Base64Json => unwrap_base64_envelope(&body).map(Bytes::from),
        }
    }
}

/// Extracts the base64 image held in the `d` field of a JSON object.
///
/// # Errors
/// Returns `NotFound` when the body is not an object or `d` is missing or
/// null, and `Decode` when `d` is not valid base64 text.
pub fn unwrap_base64_envelope(body: &[u8]) -> FetchResult<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::decode(format!("Invalid JSON body: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(FetchError::not_found("response is not an object"));
    };

    match object.get("d") {
        None | Some(serde_json::Value::Null) => Err(FetchError::not_found("no texture in response")),
        Some(serde_json::Value::String(encoded)) => STANDARD
            .decode(encoded)
            .map_err(|e| FetchError::decode(format!("Invalid base64 texture: {e}"))),
        Some(_) => Err(FetchError::decode("texture field is not a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_envelope() {
        let body = format!(r#"{{"d":"{}"}}"#, STANDARD.encode(b"\x89PNG"));
        assert_eq!(unwrap_base64_envelope(body.as_bytes()).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_unwrap_envelope_missing_texture() {
        assert!(matches!(
            unwrap_base64_envelope(br#"{"d":null}"#),
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            unwrap_base64_envelope(br#"{"other":1}"#),
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            unwrap_base64_envelope(b"[]"),
            Err(FetchError::NotFound(_))
        ));
    }

    #[test]
    fn test_unwrap_envelope_malformed() {
        assert!(matches!(
            unwrap_base64_envelope(b"<html>"),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            unwrap_base64_envelope(br#"{"d":"***"}"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            unwrap_base64_envelope(br#"{"d":5}"#),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpTextureSource::new("skincache/test", DEFAULT_TIMEOUT).is_ok());
    }
}
