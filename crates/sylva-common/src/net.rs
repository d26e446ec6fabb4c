//! HTTP and `data:` URL fetching.
//!
//! Provides simple blocking GET wrappers used by [`crate::DefaultLoader`] to
//! retrieve remote documents and stylesheets.

use std::time::Duration;

use base64::Engine;

use crate::loader::{LoadError, Resource};

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("sylva/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed `data:` URL that can be decoded into raw bytes.
pub struct DataUrl<'a> {
    /// Media type and parameters between `data:` and the comma.
    pub metadata: &'a str,
    /// Payload after the comma.
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a raw `data:` URL into metadata and payload.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DataUrl`] if the URL has no `data:` scheme or no comma.
    pub fn parse(raw: &'a str) -> Result<Self, LoadError> {
        let rest = raw
            .strip_prefix("data:")
            .ok_or_else(|| LoadError::DataUrl(format!("not a data URL: {raw}")))?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| LoadError::DataUrl("missing comma".to_string()))?;
        Ok(Self { metadata, payload })
    }

    /// The media type, `text/plain` when omitted.
    #[must_use]
    pub fn media_type(&self) -> &'a str {
        let media = self
            .metadata
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if media.is_empty() { "text/plain" } else { media }
    }

    /// Decode the payload into raw bytes.
    ///
    /// Base64 payloads are decoded, anything else is taken literally.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DataUrl`] if base64 decoding fails.
    pub fn decode(&self) -> Result<Vec<u8>, LoadError> {
        if self.metadata.ends_with(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(self.payload)
                .map_err(|e| LoadError::DataUrl(format!("base64 decode error: {e}")))
        } else {
            Ok(self.payload.as_bytes().to_vec())
        }
    }
}

/// Fetch an `http(s)` URL.
///
/// # Errors
///
/// Returns [`LoadError::Network`] if the client cannot be built, the request
/// fails or the body cannot be read, and [`LoadError::Status`] on a
/// non-success response.
pub fn fetch(url: &str) -> Result<Resource, LoadError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| LoadError::Network(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| LoadError::Network(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .map_err(|e| LoadError::Network(format!("failed to read response body: {e}")))?;

    Ok(Resource {
        bytes: bytes.to_vec(),
        content_type,
        location: url.to_string(),
    })
}

/// Decode a `data:` URL into a [`Resource`].
///
/// # Errors
///
/// Returns [`LoadError::DataUrl`] if the URL is malformed.
pub fn fetch_data_url(url: &str) -> Result<Resource, LoadError> {
    let data = DataUrl::parse(url)?;
    Ok(Resource {
        bytes: data.decode()?,
        content_type: Some(data.media_type().to_string()),
        location: url.to_string(),
    })
}
