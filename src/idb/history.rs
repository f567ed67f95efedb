//! Validity periods of IDB versions
//!
//! The catalog root may carry an `idbVersionHistory.json` file mapping each
//! release to the UTC interval `[validFrom, validUntil)` during which packets
//! must be decoded with it. Only the greatest version may leave `validUntil`
//! open, and no two intervals may overlap.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::idb::error::IdbError;
use crate::idb::version::VersionId;

/// Half-open UTC interval `[start, end)`; `end == None` means "until further notice"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityPeriod {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl ValidityPeriod {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, utc: DateTime<Utc>) -> bool {
        utc >= self.start && self.end.is_none_or(|end| utc < end)
    }

    fn overlaps(&self, other: &ValidityPeriod) -> bool {
        let self_before_other = self.end.is_some_and(|end| end <= other.start);
        let other_before_self = other.end.is_some_and(|end| end <= self.start);
        !self_before_other && !other_before_self
    }
}

/// One entry of the history file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub version: VersionId,
    pub valid_from: DateTime<Utc>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    pub fn period(&self) -> ValidityPeriod {
        ValidityPeriod::new(self.valid_from, self.valid_until)
    }
}

/// Validated set of validity periods, ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHistory {
    entries: Vec<HistoryEntry>,
}

impl VersionHistory {
    /// Load the history file, or an empty history if it does not exist
    pub fn load(path: &Path) -> Result<Self, IdbError> {
        if !path.is_file() {
            debug!("No version history at {:?}", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let entries: Vec<HistoryEntry> = serde_json::from_str(&content)
            .map_err(|e| IdbError::InvalidHistory(format!("{}: {}", path.display(), e)))?;

        debug!("Loaded {} history entries from {:?}", entries.len(), path);
        Self::from_entries(entries)
    }

    /// Validate entries and build a history
    ///
    /// Fails on empty or reversed intervals, duplicate versions, open-ended
    /// intervals on anything but the greatest version, and overlaps.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Result<Self, IdbError> {
        for entry in &entries {
            if entry.valid_until.is_some_and(|end| end <= entry.valid_from) {
                return Err(IdbError::InvalidHistory(format!(
                    "version {} ends before it starts",
                    entry.version
                )));
            }
        }

        let mut by_version: Vec<&HistoryEntry> = entries.iter().collect();
        by_version.sort_by_key(|entry| entry.version);
        for pair in by_version.windows(2) {
            if pair[0].version == pair[1].version {
                return Err(IdbError::InvalidHistory(format!(
                    "version {} listed more than once",
                    pair[0].version
                )));
            }
        }

        if let Some(latest) = by_version.last().map(|entry| entry.version) {
            let open_ended = by_version
                .iter()
                .find(|entry| entry.valid_until.is_none() && entry.version != latest);
            if let Some(entry) = open_ended {
                return Err(IdbError::InvalidHistory(format!(
                    "only the latest version {} may be open-ended, but {} is",
                    latest, entry.version
                )));
            }
        }

        entries.sort_by_key(|entry| entry.valid_from);
        for pair in entries.windows(2) {
            if pair[0].period().overlaps(&pair[1].period()) {
                return Err(IdbError::OverlappingValidity {
                    first: pair[0].version,
                    second: pair[1].version,
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validity period assigned to `version`, if any
    pub fn period_of(&self, version: VersionId) -> Option<ValidityPeriod> {
        self.entries
            .iter()
            .find(|entry| entry.version == version)
            .map(HistoryEntry::period)
    }

    /// The version whose period contains `utc`, installed or not
    pub fn version_at(&self, utc: DateTime<Utc>) -> Option<VersionId> {
        self.entries
            .iter()
            .find(|entry| entry.period().contains(utc))
            .map(|entry| entry.version)
    }
}
