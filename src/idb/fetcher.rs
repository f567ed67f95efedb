//! Fetcher trait for retrieving IDB artifacts from a remote repository

#[cfg(test)]
use mockall::automock;

use crate::idb::error::FetchError;
use crate::idb::version::VersionId;

/// Trait for fetching version artifacts from a remote source
#[cfg_attr(test, automock)]
pub trait Fetcher: Send + Sync {
    /// Human-readable description of the source, for logs
    fn describe(&self) -> String;

    /// Fetches the primary artifact (`idb.sqlite`) of a version
    ///
    /// # Arguments
    /// * `version` - The version to fetch
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The complete artifact contents
    /// * `Err(FetchError)` - If the fetch fails
    fn fetch_artifact(&self, version: VersionId) -> Result<Vec<u8>, FetchError>;
}
