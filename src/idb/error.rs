use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::idb::version::VersionId;

#[derive(Debug, Error)]
pub enum IdbError {
    #[error("path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Version {label} not found in {}", root.display())]
    VersionNotFound { label: String, root: PathBuf },

    #[error("No IDB version covers {0}")]
    DateOutOfRange(DateTime<Utc>),

    #[error("Version {0} already exists locally; use force to overwrite")]
    VersionConflict(VersionId),

    #[error("Download of version {version} failed: {source}")]
    DownloadFailed {
        version: VersionId,
        #[source]
        source: DownloadFailure,
    },

    #[error("No complete IDB versions installed in {}", .0.display())]
    NoVersionsInstalled(PathBuf),

    #[error("Validity periods of versions {first} and {second} overlap")]
    OverlappingValidity { first: VersionId, second: VersionId },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid version history: {0}")]
    InvalidHistory(String),

    #[error("IDB handle for version {0} has been closed")]
    HandleClosed(VersionId),

    #[error("IDB handle for version {0} is not connected")]
    NotConnected(VersionId),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a download did not produce an installed version
#[derive(Debug, Error)]
pub enum DownloadFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Version not found on remote: {0}")]
    NotFound(VersionId),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A label that does not normalize to a version triple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid IDB version label: {0:?}")]
pub struct InvalidVersionLabel(pub String);
