//! Blueprint manifest resolution (manifest.yaml)
//!
//! A manifest is optional. Whatever goes wrong while fetching or parsing
//! it, resolution yields an empty manifest and the entry is built from
//! filename and tag defaults instead. The failure kind is only logged.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::blueprint::{null_as_blank, null_as_empty};
use super::config::SyncConfig;
use super::error::FetchError;
use super::source::ReleaseSource;

/// Per-blueprint metadata; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    #[serde(deserialize_with = "null_as_blank")]
    pub name: String,
    #[serde(deserialize_with = "null_as_blank")]
    pub version: String,
    #[serde(deserialize_with = "null_as_blank")]
    pub description: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl Manifest {
    /// Parse manifest from YAML string. An empty document is an empty manifest.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// How a manifest lookup ended
#[derive(Debug)]
pub enum ManifestOutcome {
    Found(Manifest),
    /// No document at the manifest path
    NotFound,
    /// Document exists but has no content
    Empty,
    /// Transport failure or unexpected HTTP status
    Unreachable(FetchError),
    /// Document is not valid manifest YAML
    Malformed(serde_yaml_ng::Error),
}

impl ManifestOutcome {
    /// Fetch and parse the manifest for `blueprint_id`
    pub async fn fetch<S>(source: &S, config: &SyncConfig, blueprint_id: &str) -> Self
    where
        S: ReleaseSource + ?Sized,
    {
        let path = config.manifest_path(blueprint_id);
        match source
            .fetch_manifest(&config.repository, &config.tag, &path)
            .await
        {
            Ok(None) => ManifestOutcome::NotFound,
            Ok(Some(content)) if content.trim().is_empty() => ManifestOutcome::Empty,
            Ok(Some(content)) => match Manifest::from_yaml(&content) {
                Ok(manifest) => ManifestOutcome::Found(manifest),
                Err(e) => ManifestOutcome::Malformed(e),
            },
            Err(e) => ManifestOutcome::Unreachable(e),
        }
    }

    /// Collapse to a manifest; every failure becomes an empty one
    pub fn into_manifest(self) -> Manifest {
        match self {
            ManifestOutcome::Found(manifest) => manifest,
            _ => Manifest::default(),
        }
    }
}

impl fmt::Display for ManifestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestOutcome::Found(_) => write!(f, "found"),
            ManifestOutcome::NotFound => write!(f, "not found"),
            ManifestOutcome::Empty => write!(f, "empty document"),
            ManifestOutcome::Unreachable(e) => write!(f, "unreachable: {e}"),
            ManifestOutcome::Malformed(e) => write!(f, "malformed: {e}"),
        }
    }
}

/// Resolve the manifest for `blueprint_id`, never failing.
///
/// Missing documents are logged at debug; unreachable or malformed ones at
/// warn so authoring mistakes stay visible.
pub async fn resolve_manifest<S>(source: &S, config: &SyncConfig, blueprint_id: &str) -> Manifest
where
    S: ReleaseSource + ?Sized,
{
    let outcome = ManifestOutcome::fetch(source, config, blueprint_id).await;
    let path = config.manifest_path(blueprint_id);

    match &outcome {
        ManifestOutcome::Found(manifest) if manifest.is_empty() => {
            debug!(
                "Manifest for {} at {} sets no known fields; using defaults",
                blueprint_id, path
            )
        }
        ManifestOutcome::Found(_) => debug!("Manifest for {} loaded from {}", blueprint_id, path),
        ManifestOutcome::NotFound | ManifestOutcome::Empty => {
            debug!(
                "Manifest for {} {} at {}; using defaults",
                blueprint_id, outcome, path
            )
        }
        ManifestOutcome::Unreachable(_) | ManifestOutcome::Malformed(_) => {
            warn!(
                "Manifest for {} {} at {}; using defaults",
                blueprint_id, outcome, path
            )
        }
    }

    outcome.into_manifest()
}

/// Fill empty fields from the blueprint id and release tag.
///
/// `tags` has no fallback and stays empty.
pub fn apply_fallbacks(mut manifest: Manifest, tag: &str, blueprint_id: &str) -> Manifest {
    if manifest.name.is_empty() {
        manifest.name = blueprint_id.to_string();
    }
    if manifest.version.is_empty() {
        manifest.version = tag.strip_prefix('v').unwrap_or(tag).to_string();
    }
    if manifest.description.is_empty() {
        manifest.description = format!("{blueprint_id} blueprint");
    }
    manifest
}
