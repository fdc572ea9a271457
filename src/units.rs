//! Site standardization table.
//!
//! Maps a lowercase local site name (the staging directory name) to the
//! remote entity that tickets for that site are filed under. Loaded from a
//! JSON object of the form:
//!
//! ```json
//! { "ubs-centro": { "id": 302, "name": "UBS Centro" } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{EntityId, SiteName};

/// Errors from loading the table.
#[derive(Debug, Error)]
pub enum UnitsError {
    #[error("failed to read units table {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid units table {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One standardized site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEntry {
    /// Remote entity id.
    pub id: EntityId,
    /// Remote entity display name, as it appears in reported tickets.
    pub name: String,
}

/// Lookup from local site name to remote entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteTable {
    entries: BTreeMap<String, UnitEntry>,
}

impl SiteTable {
    /// Builds a table; keys are lowercased.
    pub fn new(entries: impl IntoIterator<Item = (String, UnitEntry)>) -> Self {
        SiteTable {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Parses a table from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, UnitEntry> = serde_json::from_str(text)?;
        Ok(Self::new(raw))
    }

    /// Loads a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, UnitsError> {
        let text = fs::read_to_string(path).map_err(|source| UnitsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| UnitsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a site by its lowercased name.
    pub fn lookup(&self, site: &SiteName) -> Option<&UnitEntry> {
        self.entries.get(&site.lookup_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TABLE: &str = r#"{
        "UBS-Centro": { "id": 302, "name": "UBS Centro" },
        "ubs-norte": { "id": 303, "name": "UBS Norte" }
    }"#;

    #[test]
    fn lookup_is_case_insensitive_on_site_name() {
        let table = SiteTable::from_json(TABLE).unwrap();
        let entry = table.lookup(&SiteName::new("ubs-centro")).unwrap();
        assert_eq!(entry.id, EntityId(302));
        assert_eq!(entry.name, "UBS Centro");
        assert!(table.lookup(&SiteName::new("UBS-NORTE")).is_some());
    }

    #[test]
    fn lookup_miss_is_none() {
        let table = SiteTable::from_json(TABLE).unwrap();
        assert!(table.lookup(&SiteName::new("unit-x")).is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = SiteTable::load(&dir.path().join("units.json")).unwrap_err();
        assert!(matches!(err, UnitsError::Read { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("units.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            SiteTable::load(&path).unwrap_err(),
            UnitsError::Parse { .. }
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("units.json");
        fs::write(&path, TABLE).unwrap();
        assert_eq!(SiteTable::load(&path).unwrap().len(), 2);
    }
}
