//! In-memory catalog of the IDB versions installed under a root directory
//!
//! The catalog is built from one explicit scan of the root and only changes
//! when [`VersionCatalog::rescan`] is called.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{HISTORY_FILE, PRIMARY_ARTIFACT};
use crate::idb::error::IdbError;
use crate::idb::history::{ValidityPeriod, VersionHistory};
use crate::idb::version::{VersionId, VersionLike, parse_label};

/// One version directory discovered under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: VersionId,
    /// Version directory (e.g. `<root>/v2.26.34`)
    pub path: PathBuf,
    /// Whether the primary artifact exists inside `path`
    pub complete: bool,
    pub validity: Option<ValidityPeriod>,
}

impl VersionRecord {
    /// Path of the primary artifact (`idb.sqlite`)
    pub fn artifact_path(&self) -> PathBuf {
        self.path.join(PRIMARY_ARTIFACT)
    }
}

#[derive(Debug)]
pub struct VersionCatalog {
    root: PathBuf,
    records: BTreeMap<VersionId, VersionRecord>,
    history: VersionHistory,
}

impl VersionCatalog {
    /// Scan `root` and build the catalog
    ///
    /// Fails with [`IdbError::RootNotFound`] if `root` is not an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, IdbError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IdbError::RootNotFound(root));
        }

        let mut catalog = Self {
            root,
            records: BTreeMap::new(),
            history: VersionHistory::default(),
        };
        catalog.rescan()?;
        Ok(catalog)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Rebuild the catalog from the filesystem
    ///
    /// On failure the previous state is kept.
    pub fn rescan(&mut self) -> Result<(), IdbError> {
        if !self.root.is_dir() {
            return Err(IdbError::RootNotFound(self.root.clone()));
        }

        let history = VersionHistory::load(&self.root.join(HISTORY_FILE))?;
        let mut records: BTreeMap<VersionId, VersionRecord> = BTreeMap::new();

        // Sorted so that duplicate spellings of a version resolve the same way every scan
        let mut entries = fs::read_dir(&self.root)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            // Follows symlinks, so linked version directories are scanned too
            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            // Hidden directories are staging/backup areas of the downloader
            if name.starts_with('.') {
                continue;
            }
            let Some(version) = parse_label(name) else {
                debug!("Skipping non-version directory {:?}", name);
                continue;
            };

            let complete = path.join(PRIMARY_ARTIFACT).is_file();
            if !complete {
                warn!(
                    "Version {} at {:?} is missing {}, treating as unavailable",
                    version, path, PRIMARY_ARTIFACT
                );
            }

            if let Some(existing) = records.get(&version) {
                if name != version.dir_name() {
                    warn!(
                        "Directories {:?} and {:?} both name version {}, keeping {:?}",
                        existing.path, path, version, existing.path
                    );
                    continue;
                }
                warn!(
                    "Directories {:?} and {:?} both name version {}, keeping the canonical one",
                    existing.path, path, version
                );
            }

            records.insert(
                version,
                VersionRecord {
                    version,
                    path,
                    complete,
                    validity: history.period_of(version),
                },
            );
        }

        info!(
            "Scanned {:?}: {} versions ({} complete)",
            self.root,
            records.len(),
            records.values().filter(|r| r.complete).count()
        );

        self.records = records;
        self.history = history;
        Ok(())
    }

    /// Complete versions in ascending order
    pub fn list_versions(&self) -> Vec<VersionId> {
        self.records().map(|record| record.version).collect()
    }

    /// Whether `version` normalizes to a present and complete version
    ///
    /// Unparsable labels report `false`.
    pub fn has_version<V: VersionLike>(&self, version: V) -> bool {
        version
            .to_version_id()
            .is_some_and(|version| self.record(version).is_some())
    }

    /// Complete record for `version`
    pub fn record(&self, version: VersionId) -> Option<&VersionRecord> {
        self.records.get(&version).filter(|record| record.complete)
    }

    /// Complete records in ascending version order
    pub fn records(&self) -> impl Iterator<Item = &VersionRecord> {
        self.records.values().filter(|record| record.complete)
    }

    /// Directory a version lives in, whether or not it exists yet
    pub fn version_dir(&self, version: VersionId) -> PathBuf {
        self.root.join(version.dir_name())
    }

    /// Record for `version` whether or not it is complete
    pub fn discovered(&self, version: VersionId) -> Option<&VersionRecord> {
        self.records.get(&version)
    }
}
