//! Blueprint entries and the catalog that holds them
//!
//! The catalog is an ordered list that is unique by `name`. New names are
//! appended; a recurring name replaces the existing entry in place.

use serde::{Deserialize, Deserializer, Serialize};

/// A single registry record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blueprint {
    /// Unique key within the catalog
    pub name: String,

    /// Version string, usually the release tag without its `v` prefix
    pub version: String,

    /// Source repository, e.g. `github.com/acme/blueprints`
    pub repo: String,

    /// Location of the blueprint inside its repository
    pub path: String,

    /// Where the packaged archive can be downloaded
    pub download_url: String,

    /// Human-readable summary of the blueprint
    pub description: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

/// The ordered, name-unique collection persisted as `registry.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_empty")]
    blueprints: Vec<Blueprint>,
}

/// What `Catalog::upsert` did with an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Name was new; entry appended at `index`
    Inserted { index: usize },
    /// Name existed; entry at `index` fully overwritten
    Replaced { index: usize },
}

impl UpsertOutcome {
    pub fn index(&self) -> usize {
        match self {
            UpsertOutcome::Inserted { index } | UpsertOutcome::Replaced { index } => *index,
        }
    }
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, keyed by exact `name` equality.
    ///
    /// A replaced entry keeps its position; every field (tags included)
    /// comes from `entry`.
    pub fn upsert(&mut self, entry: Blueprint) -> UpsertOutcome {
        match self.blueprints.iter().position(|b| b.name == entry.name) {
            Some(index) => {
                self.blueprints[index] = entry;
                UpsertOutcome::Replaced { index }
            }
            None => {
                self.blueprints.push(entry);
                UpsertOutcome::Inserted {
                    index: self.blueprints.len() - 1,
                }
            }
        }
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|b| b.name == name)
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Blueprint> {
        self.blueprints.iter()
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}

impl FromIterator<Blueprint> for Catalog {
    /// Builds a catalog by upserting each entry in turn
    fn from_iter<I: IntoIterator<Item = Blueprint>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for entry in iter {
            catalog.upsert(entry);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Blueprint;
    type IntoIter = std::slice::Iter<'a, Blueprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.blueprints.iter()
    }
}

/// Read `null` as an empty string
pub(crate) fn null_as_blank<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read `null` (or an absent field, with `#[serde(default)]`) as an empty list
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
