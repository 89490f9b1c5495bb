//! Registry file management (registry.json)
//!
//! Loads and saves the catalog. A missing file is an empty catalog; saves
//! go through a temporary file so a failed write never clobbers the
//! previous registry.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::error::{Result, SyncError};
use super::Catalog;

/// Reads and writes a catalog at a fixed path
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog, or an empty one if the file does not exist
    pub fn load(&self) -> Result<Catalog> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No registry at {}, starting empty", self.path.display());
                return Ok(Catalog::new());
            }
            Err(source) => {
                return Err(SyncError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let catalog: Catalog =
            serde_json::from_slice(&content).map_err(|source| SyncError::Decode {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            "Loaded {} blueprints from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(catalog)
    }

    /// Save the catalog with two-space indentation and a trailing newline
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let persist_err = |source: std::io::Error| SyncError::Persist {
            path: self.path.clone(),
            source,
        };

        let mut content = serde_json::to_string_pretty(catalog)
            .map_err(|e| persist_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        content.push('\n');

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(persist_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(persist_err)?;
        tmp.write_all(content.as_bytes()).map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        #[cfg(unix)]
        tmp.as_file()
            .set_permissions(self.target_permissions())
            .map_err(persist_err)?;
        tmp.persist(&self.path).map_err(|e| persist_err(e.error))?;

        tracing::debug!(
            "Saved {} blueprints to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Mode of the existing registry, or 0644 for a new one
    #[cfg(unix)]
    fn target_permissions(&self) -> std::fs::Permissions {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => meta.permissions(),
            _ => std::fs::Permissions::from_mode(0o644),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Blueprint;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn make_entry(name: &str, tags: &[&str]) -> Blueprint {
        Blueprint {
            name: name.to_string(),
            version: "1.2.3".to_string(),
            repo: "github.com/acme/blueprints".to_string(),
            path: format!("blueprints/{name}"),
            download_url: format!("https://example.com/{name}.zip"),
            description: format!("{name} blueprint"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("registry.json"));

        let catalog = store.load().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("registry.json"));

        let catalog: Catalog = vec![make_entry("api", &["go", "http"]), make_entry("cli", &[])]
            .into_iter()
            .collect();
        store.save(&catalog).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_save_format_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("registry.json"));

        let catalog: Catalog = std::iter::once(make_entry("api", &[])).collect();
        store.save(&catalog).unwrap();

        let written = std::fs::read_to_string(store.path()).unwrap();
        let expected = r#"{
  "blueprints": [
    {
      "name": "api",
      "version": "1.2.3",
      "repo": "github.com/acme/blueprints",
      "path": "blueprints/api",
      "download_url": "https://example.com/api.zip",
      "description": "api blueprint",
      "tags": []
    }
  ]
}
"#;
        assert_eq!(written, expected);
    }

    #[test]
    fn test_save_empty_catalog_writes_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("registry.json"));

        store.save(&Catalog::new()).unwrap();

        let written = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(written, "{\n  \"blueprints\": []\n}\n");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("site/data/registry.json"));

        store.save(&Catalog::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_malformed_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CatalogStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SyncError::Decode { .. }));
    }

    #[test]
    fn test_load_invalid_utf8_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");
        std::fs::write(&path, b"{\"blueprints\": [\xff]}").unwrap();

        let err = CatalogStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SyncError::Decode { .. }));
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_registry_is_world_readable() {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::new(temp_dir.path().join("registry.json"));

        store.save(&Catalog::new()).unwrap();
        assert_eq!(mode_of(store.path()), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");

        for mode in [0o644, 0o640] {
            std::fs::write(&path, "{\"blueprints\": []}\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();

            let store = CatalogStore::new(&path);
            let catalog: Catalog = std::iter::once(make_entry("api", &[])).collect();
            store.save(&catalog).unwrap();

            assert_eq!(mode_of(&path), mode);
            assert_eq!(store.load().unwrap(), catalog);
        }
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        // A directory in place of the target makes the final rename fail
        let path = temp_dir.path().join("registry.json");
        std::fs::create_dir(&path).unwrap();

        let err = CatalogStore::new(&path).save(&Catalog::new()).unwrap_err();
        assert!(matches!(err, SyncError::Persist { .. }));
        assert!(path.is_dir());
    }
}
