//! Resource loading for documents and stylesheets.
//!
//! The parser, the CSS engine and the XSLT transformer never perform I/O
//! themselves; they go through a [`ResourceLoader`]. [`DefaultLoader`] reads
//! local files and fetches `http(s)` and `data:` URLs.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::net;

/// Error type for resource loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a local file
    #[error("failed to read '{path}': {source}")]
    File {
        /// The path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Transport-level failure while fetching a URL
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-success status
    #[error("HTTP error {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },
    /// Malformed `data:` URL
    #[error("invalid data URL: {0}")]
    DataUrl(String),
}

/// Raw bytes of a loaded resource plus the metadata needed to interpret them.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Undecoded body
    pub bytes: Vec<u8>,
    /// Content type as reported by the transport (or guessed from the extension)
    pub content_type: Option<String>,
    /// Where the resource came from, used to resolve relative references
    pub location: String,
}

impl Resource {
    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Something that turns a location (path or URL) into bytes.
pub trait ResourceLoader {
    /// Load the resource at `location`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] describing why the resource is unavailable.
    fn load(&self, location: &str) -> Result<Resource, LoadError>;
}

/// Loader for local files, `http(s)` URLs and `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLoader;

impl ResourceLoader for DefaultLoader {
    fn load(&self, location: &str) -> Result<Resource, LoadError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return net::fetch(location);
        }
        if location.starts_with("data:") {
            return net::fetch_data_url(location);
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        let bytes = fs::read(path).map_err(|source| LoadError::File {
            path: path.to_string(),
            source,
        })?;
        Ok(Resource {
            bytes,
            content_type: guess_content_type(Path::new(path)).map(str::to_string),
            location: location.to_string(),
        })
    }
}

/// Content type implied by a file extension.
fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "css" => Some("text/css"),
        "xsl" | "xslt" => Some("text/xsl"),
        "xml" => Some("text/xml"),
        "html" | "htm" => Some("text/html"),
        _ => None,
    }
}
