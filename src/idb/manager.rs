//! Entry point tying catalog, resolver, downloader and handles together

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::IdbConfig;
use crate::idb::catalog::{VersionCatalog, VersionRecord};
use crate::idb::downloader::Downloader;
use crate::idb::error::IdbError;
use crate::idb::fetcher::Fetcher;
use crate::idb::fetchers::HttpFetcher;
use crate::idb::handle::{IdbGuard, IdbHandle};
use crate::idb::resolver::{self, IdbSelector};
use crate::idb::version::{VersionId, VersionLike};

/// Version manager over one catalog root
///
/// The catalog is scanned once at construction; call [`IdbManager::rescan`]
/// to pick up changes made behind the manager's back. Mutating operations
/// take `&mut self` and are not synchronized.
pub struct IdbManager {
    catalog: VersionCatalog,
    downloader: Downloader,
}

impl IdbManager {
    /// Manager over `root` downloading from the default remote repository
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, IdbError> {
        Self::with_fetcher(root, Box::new(HttpFetcher::default()))
    }

    pub fn with_fetcher(
        root: impl Into<PathBuf>,
        fetcher: Box<dyn Fetcher>,
    ) -> Result<Self, IdbError> {
        let catalog = VersionCatalog::new(root)?;
        info!(
            "IDB manager ready at {:?} with versions {:?}",
            catalog.root(),
            catalog
                .list_versions()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );

        Ok(Self {
            catalog,
            downloader: Downloader::new(fetcher),
        })
    }

    /// Manager over the configured root and remote repository
    pub fn from_config(config: &IdbConfig) -> Result<Self, IdbError> {
        let fetcher = HttpFetcher::from_config(&config.remote).map_err(|e| {
            IdbError::InvalidConfig(format!("cannot build HTTP client: {}", e))
        })?;
        Self::with_fetcher(config.root(), Box::new(fetcher))
    }

    pub fn data_root(&self) -> &Path {
        self.catalog.root()
    }

    pub fn catalog(&self) -> &VersionCatalog {
        &self.catalog
    }

    /// Re-read the root directory and the version history
    pub fn rescan(&mut self) -> Result<(), IdbError> {
        self.catalog.rescan()
    }

    /// Complete versions in ascending order
    pub fn list_versions(&self) -> Vec<VersionId> {
        self.catalog.list_versions()
    }

    /// Complete records in ascending order
    pub fn records(&self) -> impl Iterator<Item = &VersionRecord> {
        self.catalog.records()
    }

    pub fn has_version<V: VersionLike>(&self, version: V) -> bool {
        self.catalog.has_version(version)
    }

    /// See [`resolver::find_version`]
    pub fn find_version(&self, utc: Option<DateTime<Utc>>) -> Result<VersionId, IdbError> {
        resolver::find_version(&self.catalog, utc)
    }

    /// Download a version from the remote repository
    ///
    /// Unparsable labels fail with [`IdbError::VersionNotFound`].
    pub fn download_version<V: VersionLike>(
        &mut self,
        version: V,
        force: bool,
    ) -> Result<PathBuf, IdbError> {
        let id = version
            .to_version_id()
            .ok_or_else(|| IdbError::VersionNotFound {
                label: version.label(),
                root: self.catalog.root().to_path_buf(),
            })?;

        self.downloader.download(&mut self.catalog, id, force)
    }

    /// Open the IDB selected by a label, version, timestamp or `None` for latest
    ///
    /// The returned handle is connected and owned by the caller, who must
    /// close it; see [`IdbManager::get_idb_scoped`] for automatic release.
    pub fn get_idb(&self, selector: impl Into<IdbSelector>) -> Result<IdbHandle, IdbError> {
        let version = resolver::resolve(&self.catalog, &selector.into())?;
        self.open(version)
    }

    /// Like [`IdbManager::get_idb`], but the handle is closed when the guard drops
    pub fn get_idb_scoped(&self, selector: impl Into<IdbSelector>) -> Result<IdbGuard, IdbError> {
        self.get_idb(selector).map(IdbHandle::scoped)
    }

    /// Like [`IdbManager::get_idb`], downloading the version first when needed
    ///
    /// An explicit version that is not installed is downloaded. A timestamp
    /// covered by a history entry whose version is not installed downloads
    /// that version. Everything else behaves exactly like `get_idb`.
    pub fn get_idb_or_download(
        &mut self,
        selector: impl Into<IdbSelector>,
    ) -> Result<IdbHandle, IdbError> {
        let selector = selector.into();
        let missing = match &selector {
            IdbSelector::Label(label) => label
                .to_version_id()
                .filter(|version| !self.catalog.has_version(*version)),
            IdbSelector::Version(version) => {
                Some(*version).filter(|version| !self.catalog.has_version(*version))
            }
            IdbSelector::At(utc) => match resolver::find_version(&self.catalog, Some(*utc)) {
                Err(IdbError::DateOutOfRange(_)) => self.catalog.history().version_at(*utc),
                _ => None,
            },
            IdbSelector::Latest => None,
        };

        if let Some(version) = missing {
            info!("IDB version {} not installed, downloading", version);
            self.downloader.download(&mut self.catalog, version, false)?;
        }

        self.get_idb(selector)
    }

    fn open(&self, version: VersionId) -> Result<IdbHandle, IdbError> {
        let record = self
            .catalog
            .record(version)
            .ok_or_else(|| IdbError::VersionNotFound {
                label: version.to_string(),
                root: self.catalog.root().to_path_buf(),
            })?;

        let mut handle = IdbHandle::new(version, record.artifact_path());
        handle.open()?;
        info!("Opened IDB {} from {:?}", version, handle.path());
        Ok(handle)
    }
}
