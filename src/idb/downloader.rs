//! Installs IDB versions from a remote source into the catalog root
//!
//! A version is staged in a hidden directory next to its final location and
//! moved into place with a rename, so the catalog either sees the complete new
//! version, the previous version, or nothing at all.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::PRIMARY_ARTIFACT;
use crate::idb::catalog::VersionCatalog;
use crate::idb::error::{DownloadFailure, IdbError};
use crate::idb::fetcher::Fetcher;
use crate::idb::version::VersionId;

/// Every SQLite database starts with this header
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

pub struct Downloader {
    fetcher: Box<dyn Fetcher>,
}

impl Downloader {
    pub fn new(fetcher: Box<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Download `version` into the catalog root and rescan the catalog
    ///
    /// Fails with [`IdbError::VersionConflict`] if the version is already
    /// installed and `force` is false. Returns the version directory.
    pub fn download(
        &self,
        catalog: &mut VersionCatalog,
        version: VersionId,
        force: bool,
    ) -> Result<PathBuf, IdbError> {
        if catalog.has_version(version) && !force {
            return Err(IdbError::VersionConflict(version));
        }

        // Replace whatever directory currently names this version, even an incomplete one
        let target = catalog
            .discovered(version)
            .map(|record| record.path.clone())
            .unwrap_or_else(|| catalog.version_dir(version));

        info!(
            "Downloading IDB version {} from {} into {:?}",
            version,
            self.fetcher.describe(),
            target
        );

        install(catalog.root(), &target, version, || {
            let bytes = self.fetcher.fetch_artifact(version)?;
            validate_artifact(&bytes)?;
            Ok(bytes)
        })
        .map_err(|source| IdbError::DownloadFailed { version, source })?;

        catalog.rescan()?;
        info!("Installed IDB version {} at {:?}", version, target);
        Ok(target)
    }
}

fn validate_artifact(bytes: &[u8]) -> Result<(), DownloadFailure> {
    if !bytes.starts_with(SQLITE_HEADER) {
        return Err(DownloadFailure::InvalidArtifact(format!(
            "payload of {} bytes is not an SQLite database",
            bytes.len()
        )));
    }
    Ok(())
}

/// Stage the artifact produced by `fetch` and swap it into `target`
fn install<F>(
    root: &Path,
    target: &Path,
    version: VersionId,
    fetch: F,
) -> Result<(), DownloadFailure>
where
    F: FnOnce() -> Result<Vec<u8>, DownloadFailure>,
{
    // Staging lives under the root so the final rename never crosses filesystems
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}-staging-", version.dir_name()))
        .tempdir_in(root)?;

    let bytes = fetch()?;
    fs::write(staging.path().join(PRIMARY_ARTIFACT), &bytes)?;
    debug!("Staged {} bytes at {:?}", bytes.len(), staging.path());

    if target.exists() {
        let backup = root.join(format!(".{}.replaced", version.dir_name()));
        if backup.exists() {
            fs::remove_dir_all(&backup)?;
        }
        fs::rename(target, &backup)?;

        if let Err(e) = fs::rename(staging.path(), target) {
            warn!("Failed to move new version into place, restoring {:?}", target);
            fs::rename(&backup, target)?;
            return Err(e.into());
        }

        if let Err(e) = fs::remove_dir_all(&backup) {
            warn!("Failed to remove replaced version at {:?}: {}", backup, e);
        }
    } else {
        fs::rename(staging.path(), target)?;
    }

    // The staging directory has been renamed away; nothing left to clean up
    let _ = staging.keep();
    Ok(())
}
