//! `blueprints sync` command
//!
//! Reads TAG / BLUEPRINTS_REPO / GITHUB_TOKEN (or the matching flags),
//! validates them, then runs one reconciliation against GitHub.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use blueprints_core::registry::{SyncConfig, SyncConfigInput, DEFAULT_CONCURRENCY};

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Release tag to import (e.g. v1.2.3)
    #[clap(long, env = "TAG")]
    pub tag: Option<String>,

    /// Blueprints repository as owner/name
    #[clap(long, env = "BLUEPRINTS_REPO")]
    pub repo: Option<String>,

    /// Bearer token for GitHub requests
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Registry file to update
    #[clap(long, env = "REGISTRY_PATH", default_value = "registry.json")]
    pub registry: PathBuf,

    /// Directory in the repository that holds one folder per blueprint
    #[clap(long, default_value = "blueprints")]
    pub package_root: String,

    /// Manifest file name inside each blueprint folder
    #[clap(long, default_value = "manifest.yaml")]
    pub manifest_file: String,

    /// Host prefix recorded in each entry's repo field
    #[clap(long, default_value = "github.com")]
    pub repo_host: String,

    /// Manifest requests in flight at once
    #[clap(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Compute the registry without writing it
    #[clap(long)]
    pub dry_run: bool,

    /// GitHub REST API base URL
    #[clap(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Raw content base URL
    #[clap(long, default_value = "https://raw.githubusercontent.com")]
    pub raw_url: String,

    /// HTTP timeout in seconds
    #[clap(long, default_value_t = 30)]
    pub timeout: u64,
}

impl SyncArgs {
    /// Validate into a `SyncConfig`; fails before any I/O happens
    pub fn to_config(&self) -> Result<SyncConfig> {
        let config = SyncConfig::try_from(SyncConfigInput {
            tag: self.tag.clone(),
            repository: self.repo.clone(),
            token: self.token.clone(),
            registry_path: Some(self.registry.clone()),
            package_root: Some(self.package_root.clone()),
            manifest_file: Some(self.manifest_file.clone()),
            repo_host: Some(self.repo_host.clone()),
            concurrency: Some(self.concurrency),
            dry_run: self.dry_run,
        })?;
        Ok(config)
    }
}

#[cfg(feature = "github")]
pub async fn execute(args: SyncArgs) -> Result<()> {
    use anyhow::Context;
    use blueprints_core::registry::{GitHubSource, GitHubSourceConfig, Reconciler};
    use std::time::Duration;

    let config = args.to_config()?;
    tracing::debug!(
        "Syncing {} @ {} into {} (api: {}, authenticated: {})",
        config.repository,
        config.tag,
        config.registry_path.display(),
        args.api_url,
        config.token.is_some()
    );

    let source = GitHubSource::new(GitHubSourceConfig {
        api_url: args.api_url,
        raw_url: args.raw_url,
        token: config.token.clone(),
        timeout: Duration::from_secs(args.timeout),
    })
    .context("Failed to create HTTP client")?;

    let reconciler = Reconciler::new(source, config);
    let report = reconciler.sync().await.with_context(|| {
        format!(
            "Failed to update registry {}",
            reconciler.config().registry_path.display()
        )
    })?;

    println!("{}", report.summary());
    Ok(())
}

/// Stub for when the github feature is disabled
#[cfg(not(feature = "github"))]
pub async fn execute(args: SyncArgs) -> Result<()> {
    args.to_config()?;
    anyhow::bail!("GitHub support is not enabled. Rebuild with --features github")
}
