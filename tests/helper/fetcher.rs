//! Fetcher test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use idb_manager::idb::error::FetchError;
use idb_manager::idb::fetcher::Fetcher;
use idb_manager::idb::version::VersionId;

/// In-memory remote repository
#[derive(Default)]
pub struct FakeFetcher {
    artifacts: HashMap<VersionId, Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(mut self, version: (u64, u64, u64), bytes: Vec<u8>) -> Self {
        self.artifacts.insert(version.into(), bytes);
        self
    }

    /// Counter of `fetch_artifact` calls, shared with the fetcher
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Fetcher for FakeFetcher {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    fn fetch_artifact(&self, version: VersionId) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.artifacts
            .get(&version)
            .cloned()
            .ok_or(FetchError::NotFound(version))
    }
}
