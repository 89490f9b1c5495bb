//! GitHub release source
//!
//! Release metadata comes from the REST API
//! (`/repos/{owner}/{repo}/releases/tags/{tag}`); manifests come from the
//! raw content host at the tag.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::error::{FetchError, Result};
use super::source::{Release, ReleaseSource};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Default transport timeout (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for `GitHubSource`
#[derive(Debug, Clone)]
pub struct GitHubSourceConfig {
    pub api_url: String,
    pub raw_url: String,
    /// Sent as `Authorization: Bearer <token>` when present
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for GitHubSourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// `ReleaseSource` backed by GitHub over HTTPS
pub struct GitHubSource {
    client: reqwest::Client,
    config: GitHubSourceConfig,
}

impl GitHubSource {
    pub fn new(config: GitHubSourceConfig) -> std::result::Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("blueprints/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: config.api_url.clone(),
                source: Box::new(e),
            })?;

        Ok(Self { client, config })
    }

    fn release_url(&self, repository: &str, tag: &str) -> String {
        format!(
            "{}/repos/{}/releases/tags/{}",
            self.config.api_url.trim_end_matches('/'),
            repository,
            tag
        )
    }

    fn raw_url(&self, repository: &str, tag: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.raw_url.trim_end_matches('/'),
            repository,
            tag,
            path.trim_start_matches('/')
        )
    }

    async fn get(&self, url: &str) -> std::result::Result<reqwest::Response, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        request.send().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        })
    }

    async fn read_body(
        url: &str,
        response: reqwest::Response,
    ) -> std::result::Result<String, FetchError> {
        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        })
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    async fn fetch_release(&self, repository: &str, tag: &str) -> Result<Release> {
        let url = self.release_url(repository, tag);
        debug!("Fetching release {} from {}", tag, url);

        let response = self.get(&url).await?;
        let status = response.status();
        let body = Self::read_body(&url, response).await?;

        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16(), &body).into());
        }

        Ok(Release::from_json(&url, &body)?)
    }

    async fn fetch_manifest(
        &self,
        repository: &str,
        tag: &str,
        path: &str,
    ) -> std::result::Result<Option<String>, FetchError> {
        let url = self.raw_url(repository, tag, path);
        debug!("Fetching manifest from {}", url);

        let response = self.get(&url).await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = Self::read_body(&url, response).await?;
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16(), &body));
        }

        Ok(Some(body))
    }

    fn name(&self) -> &'static str {
        "github"
    }
}
