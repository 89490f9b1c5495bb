//! Blueprint Registry - Release reconciliation
//!
//! This module keeps a persisted blueprint catalog (`registry.json`)
//! in step with a tagged release of a blueprints repository.
//!
//! # Overview
//!
//! For every `<id>.zip` asset attached to the release, an entry is derived
//! from `<package-root>/<id>/manifest.yaml` at that tag (falling back to
//! filename and tag defaults) and upserted into the catalog by name.
//!
//! # Architecture
//!
//! ```text
//! Release (GitHub API)
//!     │
//!     ├── <id>.zip assets        ← one blueprint per archive
//!     └── <root>/<id>/manifest.yaml at the tag
//!            │
//!            ▼
//!     Reconciler ── upsert by name ──▶ Catalog
//!            │
//!            ▼
//!     registry.json (CatalogStore)
//! ```

mod blueprint;
mod config;
mod error;
#[cfg(feature = "github")]
mod github;
mod manifest;
mod reconciler;
mod source;
mod store;

pub use blueprint::{Blueprint, Catalog, UpsertOutcome};
pub use config::{
    SyncConfig, SyncConfigInput, DEFAULT_CONCURRENCY, DEFAULT_MANIFEST_FILE,
    DEFAULT_PACKAGE_ROOT, DEFAULT_REGISTRY_PATH, DEFAULT_REPO_HOST,
};
pub use error::{FetchError, Result, SyncError};
#[cfg(feature = "github")]
pub use github::{GitHubSource, GitHubSourceConfig, DEFAULT_API_URL, DEFAULT_RAW_URL};
pub use manifest::{apply_fallbacks, resolve_manifest, Manifest, ManifestOutcome};
pub use reconciler::{blueprint_id, Reconciler, SyncReport, ARCHIVE_SUFFIX};
pub use source::{Release, ReleaseAsset, ReleaseSource};
pub use store::CatalogStore;
