//! Release reconciliation
//!
//! Turns the `.zip` assets of one release into blueprint entries and
//! upserts them into the catalog, in release asset order.

use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::config::SyncConfig;
use super::error::Result;
use super::manifest::{apply_fallbacks, resolve_manifest, Manifest};
use super::source::{Release, ReleaseAsset, ReleaseSource};
use super::{Blueprint, Catalog, CatalogStore, UpsertOutcome};

/// Suffix of the asset names that carry a blueprint
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Blueprint id for a release asset, or `None` if the asset is not a package archive
pub fn blueprint_id(asset_name: &str) -> Option<&str> {
    asset_name
        .strip_suffix(ARCHIVE_SUFFIX)
        .filter(|id| !id.is_empty())
}

/// Result of one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub tag: String,
    pub completed_at: DateTime<Utc>,
    /// Catalog size after the run
    pub total_entries: usize,
    /// Names appended to the catalog
    pub inserted: Vec<String>,
    /// Names overwritten in place
    pub replaced: Vec<String>,
    /// Assets that are not package archives
    pub skipped_assets: Vec<String>,
    /// Whether the catalog was written back
    pub persisted: bool,
}

impl SyncReport {
    /// One-line completion summary
    pub fn summary(&self) -> String {
        let verb = if self.persisted {
            "registry updated"
        } else {
            "registry dry run"
        };
        format!(
            "{} for {} at {} with {} entries",
            verb,
            self.tag,
            self.completed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.total_entries
        )
    }
}

/// Keeps a catalog in step with a release
pub struct Reconciler<S> {
    source: S,
    config: SyncConfig,
}

impl<S: ReleaseSource> Reconciler<S> {
    pub fn new(source: S, config: SyncConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the registry, apply the release and save it back.
    ///
    /// Nothing is written unless every step before the save succeeded.
    pub async fn sync(&self) -> Result<SyncReport> {
        let store = CatalogStore::new(&self.config.registry_path);
        let mut catalog = store.load()?;

        let mut report = self.reconcile(&mut catalog).await?;

        if self.config.dry_run {
            info!("Dry run: not writing {}", store.path().display());
        } else {
            store.save(&catalog)?;
            report.persisted = true;
        }

        report.completed_at = Utc::now();
        Ok(report)
    }

    /// Fetch the release and upsert its blueprints into `catalog`
    pub async fn reconcile(&self, catalog: &mut Catalog) -> Result<SyncReport> {
        info!(
            "Fetching release {} of {} via {}",
            self.config.tag,
            self.config.repository,
            self.source.name()
        );
        let release = self
            .source
            .fetch_release(&self.config.repository, &self.config.tag)
            .await?;

        if !release.tag_name.is_empty() && release.tag_name != self.config.tag {
            debug!(
                "Release reports tag {} (requested {})",
                release.tag_name, self.config.tag
            );
        }

        let (entries, skipped_assets) = self.resolve_entries(&release).await;

        let mut report = SyncReport {
            tag: self.config.tag.clone(),
            completed_at: Utc::now(),
            total_entries: 0,
            inserted: Vec::new(),
            replaced: Vec::new(),
            skipped_assets,
            persisted: false,
        };

        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.name.clone()) {
                warn!(
                    "Release {} produces blueprint '{}' more than once; the later asset wins",
                    self.config.tag, entry.name
                );
            }

            let name = entry.name.clone();
            let outcome = catalog.upsert(entry);
            debug!("{:?} {} at position {}", outcome, name, outcome.index());
            match outcome {
                UpsertOutcome::Inserted { .. } => report.inserted.push(name),
                UpsertOutcome::Replaced { .. } => report.replaced.push(name),
            }
        }

        report.total_entries = catalog.len();
        info!(
            "Applied release {}: {} added, {} replaced, {} skipped",
            self.config.tag,
            report.inserted.len(),
            report.replaced.len(),
            report.skipped_assets.len()
        );
        Ok(report)
    }

    /// Build entries for every package archive, in release asset order.
    ///
    /// Manifests are fetched with up to `concurrency` requests in flight;
    /// the returned order does not depend on completion order.
    pub async fn resolve_entries(&self, release: &Release) -> (Vec<Blueprint>, Vec<String>) {
        let mut skipped = Vec::new();
        let mut archives = Vec::new();

        for asset in &release.assets {
            match blueprint_id(&asset.name) {
                Some(id) => archives.push((asset, id)),
                None => {
                    debug!("Skipping non-archive asset {}", asset.name);
                    skipped.push(asset.name.clone());
                }
            }
        }

        let entries: Vec<Blueprint> = stream::iter(archives)
            .map(move |(asset, id)| async move {
                let manifest = resolve_manifest(&self.source, &self.config, id).await;
                self.build_entry(asset, id, manifest)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        (entries, skipped)
    }

    /// Combine an asset and its (possibly empty) manifest into a catalog entry
    pub fn build_entry(
        &self,
        asset: &ReleaseAsset,
        blueprint_id: &str,
        manifest: Manifest,
    ) -> Blueprint {
        let manifest = apply_fallbacks(manifest, &self.config.tag, blueprint_id);

        Blueprint {
            name: manifest.name,
            version: manifest.version,
            repo: self.config.repo_ref(),
            path: self.config.blueprint_path(blueprint_id),
            download_url: asset.download_url.clone(),
            description: manifest.description,
            tags: manifest.tags,
        }
    }
}
