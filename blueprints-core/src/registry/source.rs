//! Release source trait - Abstraction over where releases come from
//!
//! `GitHubSource` talks to the GitHub REST API; tests plug in in-memory
//! sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::blueprint::null_as_empty;
use super::error::{FetchError, Result};

/// A tagged release and its attached assets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,

    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

impl ReleaseAsset {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }
}

impl Release {
    /// Parse the release-by-tag JSON document
    pub fn from_json(url: &str, body: &str) -> std::result::Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|source| FetchError::InvalidRelease {
            url: url.to_string(),
            source,
        })
    }
}

/// Trait for release and manifest providers
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Look up the release for `tag`. Any failure is fatal to the run.
    async fn fetch_release(&self, repository: &str, tag: &str) -> Result<Release>;

    /// Fetch a file from the repository at `tag`.
    ///
    /// `Ok(None)` means the file does not exist.
    async fn fetch_manifest(
        &self,
        repository: &str,
        tag: &str,
        path: &str,
    ) -> std::result::Result<Option<String>, FetchError>;

    /// Source identifier for logging
    fn name(&self) -> &'static str;
}
