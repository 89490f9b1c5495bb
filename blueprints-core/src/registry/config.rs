//! Sync configuration
//!
//! Raw inputs (flags, environment) arrive as a `SyncConfigInput` and are
//! validated once into a `SyncConfig`. Nothing past this boundary checks
//! for missing values again.

use std::path::PathBuf;

use super::error::SyncError;

pub const DEFAULT_REGISTRY_PATH: &str = "registry.json";
pub const DEFAULT_PACKAGE_ROOT: &str = "blueprints";
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.yaml";
pub const DEFAULT_REPO_HOST: &str = "github.com";
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Unvalidated sync settings, every field optional
#[derive(Debug, Clone, Default)]
pub struct SyncConfigInput {
    pub tag: Option<String>,
    pub repository: Option<String>,
    pub token: Option<String>,
    pub registry_path: Option<PathBuf>,
    pub package_root: Option<String>,
    pub manifest_file: Option<String>,
    pub repo_host: Option<String>,
    pub concurrency: Option<usize>,
    pub dry_run: bool,
}

/// Validated settings for one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Release tag, e.g. `v1.2.3`
    pub tag: String,
    /// `owner/name`
    pub repository: String,
    /// Bearer credential for authenticated fetches
    pub token: Option<String>,
    pub registry_path: PathBuf,
    /// Directory holding one sub-directory per blueprint
    pub package_root: String,
    pub manifest_file: String,
    pub repo_host: String,
    /// Manifest requests in flight at once
    pub concurrency: usize,
    /// Compute the catalog without saving it
    pub dry_run: bool,
}

impl SyncConfig {
    /// Shorthand for the required fields with everything else defaulted
    pub fn new(tag: impl Into<String>, repository: impl Into<String>) -> Result<Self, SyncError> {
        SyncConfigInput {
            tag: Some(tag.into()),
            repository: Some(repository.into()),
            ..Default::default()
        }
        .try_into()
    }

    /// Value stored in each entry's `repo` field
    pub fn repo_ref(&self) -> String {
        format!("{}/{}", self.repo_host, self.repository)
    }

    /// Location of a blueprint inside the repository
    pub fn blueprint_path(&self, blueprint_id: &str) -> String {
        format!("{}/{}", self.package_root, blueprint_id)
    }

    /// Location of a blueprint's manifest inside the repository
    pub fn manifest_path(&self, blueprint_id: &str) -> String {
        format!("{}/{}", self.blueprint_path(blueprint_id), self.manifest_file)
    }
}

impl TryFrom<SyncConfigInput> for SyncConfig {
    type Error = SyncError;

    fn try_from(input: SyncConfigInput) -> Result<Self, Self::Error> {
        let tag = required(input.tag, "TAG")?;
        let repository = required(input.repository, "BLUEPRINTS_REPO")?;

        let mut parts = repository.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !well_formed {
            return Err(SyncError::config(format!(
                "repository must be of the form owner/name, got '{repository}'"
            )));
        }

        let concurrency = input.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(SyncError::config("concurrency must be at least 1"));
        }

        let package_root = input
            .package_root
            .map(|root| root.trim_matches('/').to_string())
            .filter(|root| !root.is_empty())
            .unwrap_or_else(|| DEFAULT_PACKAGE_ROOT.to_string());

        Ok(Self {
            tag,
            repository,
            token: input.token.filter(|t| !t.trim().is_empty()),
            registry_path: input
                .registry_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_PATH)),
            package_root,
            manifest_file: input
                .manifest_file
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_MANIFEST_FILE.to_string()),
            repo_host: input
                .repo_host
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_REPO_HOST.to_string()),
            concurrency,
            dry_run: input.dry_run,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, SyncError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SyncError::config(format!("missing {name}"))),
    }
}
