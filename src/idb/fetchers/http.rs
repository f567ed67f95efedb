//! HTTP fetcher for the remote IDB repository
//!
//! Artifacts are addressed as `<base_url>/v<version>/idb.sqlite`.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::debug;

use crate::config::{DEFAULT_BASE_URL, DOWNLOAD_TIMEOUT_MS, PRIMARY_ARTIFACT, RemoteConfig};
use crate::idb::error::FetchError;
use crate::idb::fetcher::Fetcher;
use crate::idb::version::VersionId;

/// Blocking HTTP client for the IDB repository
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string())
    }
}

impl HttpFetcher {
    /// Fetcher for `base_url` with the default download timeout
    pub fn new(base_url: String) -> Self {
        let timeout = Duration::from_millis(DOWNLOAD_TIMEOUT_MS);
        Self {
            client: Self::build_client(timeout).expect("Failed to create HTTP client"),
            base_url,
            timeout,
        }
    }

    /// Build a fetcher honouring the configured base URL and timeout
    pub fn from_config(config: &RemoteConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_millis(config.timeout_ms);

        Ok(Self {
            client: Self::build_client(timeout)?,
            base_url: config.base_url.clone(),
            timeout,
        })
    }

    fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
        Client::builder()
            .user_agent("idb-manager")
            .timeout(timeout)
            .build()
    }

    /// Timeout applied to a whole artifact download
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn artifact_url(&self, version: VersionId) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            version.dir_name(),
            PRIMARY_ARTIFACT
        )
    }
}

impl Fetcher for HttpFetcher {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch_artifact(&self, version: VersionId) -> Result<Vec<u8>, FetchError> {
        let url = self.artifact_url(version);
        debug!("Fetching IDB artifact: {}", url);

        let response = self.client.get(&url).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(version));
        }

        if !response.status().is_success() {
            return Err(FetchError::InvalidResponse(format!(
                "IDB repository returned status {}",
                response.status()
            )));
        }

        let bytes = response.bytes()?;

        debug!("Fetched {} bytes for version {}", bytes.len(), version);

        Ok(bytes.to_vec())
    }
}
