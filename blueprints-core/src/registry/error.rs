//! Registry sync error types
//!
//! Every variant here is fatal to a sync run. Manifest resolution failures
//! never surface as errors; see `manifest::resolve_manifest`.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed transport error, so the taxonomy does not depend on the HTTP client
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Maximum number of response-body bytes kept in a `FetchError::Status`
pub const BODY_EXCERPT_LIMIT: usize = 512;

/// Errors that abort a registry sync
#[derive(Error, Debug)]
pub enum SyncError {
    /// A required input is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// The release lookup failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The catalog file exists but could not be read
    #[error("Failed to read registry from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is malformed
    #[error("Failed to parse registry {path} (corrupted or invalid format)")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog could not be written
    #[error("Failed to write registry to {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Release lookup failures
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("GET {url}: HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response
    #[error("GET {url}: request failed")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The release document is not the expected JSON shape
    #[error("GET {url}: invalid release document")]
    InvalidRelease {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config(message.into())
    }
}

impl FetchError {
    /// Build a status error, keeping at most `BODY_EXCERPT_LIMIT` bytes of the body
    pub fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        FetchError::Status {
            url: url.into(),
            status,
            body: excerpt(body, BODY_EXCERPT_LIMIT).to_string(),
        }
    }

    /// HTTP status, when the server responded
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Truncate on a char boundary at or below `limit` bytes
fn excerpt(body: &str, limit: usize) -> &str {
    if body.len() <= limit {
        return body;
    }
    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
