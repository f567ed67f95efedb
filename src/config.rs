use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::idb::error::ConfigError;

// =============================================================================
// Layout constants
// =============================================================================

/// File that must exist inside a version directory for it to be usable
pub const PRIMARY_ARTIFACT: &str = "idb.sqlite";

/// Validity history file at the catalog root
pub const HISTORY_FILE: &str = "idbVersionHistory.json";

// =============================================================================
// Remote-related constants
// =============================================================================

/// Default remote IDB repository
pub const DEFAULT_BASE_URL: &str = "https://pub099.cs.technik.fhnw.ch/data/idb";

/// Timeout for a single artifact download in milliseconds (5 minutes)
pub const DOWNLOAD_TIMEOUT_MS: u64 = 5 * 60 * 1000;

/// Manager configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IdbConfig {
    /// Catalog root; defaults to [`default_root`]
    pub data_root: Option<PathBuf>,
    pub remote: RemoteConfig,
}

/// Remote repository configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteConfig {
    pub base_url: String,
    /// Download timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DOWNLOAD_TIMEOUT_MS,
        }
    }
}

impl IdbConfig {
    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Effective catalog root
    pub fn root(&self) -> PathBuf {
        self.data_root.clone().unwrap_or_else(default_root)
    }
}

/// Returns the path to the data directory for idb-manager.
/// Uses $XDG_DATA_HOME/idb-manager if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/idb-manager,
/// or ./idb-manager if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default catalog root.
pub fn default_root() -> PathBuf {
    data_dir().join("idb")
}

/// Returns the path to the config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("idb-manager.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("idb-manager")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn idb_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<IdbConfig>(json!({
            "remote": {
                "timeoutMs": 1000
            }
        }))
        .unwrap();

        assert_eq!(result.remote.timeout_ms, 1000);
        assert_eq!(result.remote.base_url, DEFAULT_BASE_URL);
        assert_eq!(result.data_root, None);
    }

    #[test]
    fn idb_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<IdbConfig>(json!({
            "dataRoot": "/srv/idb",
            "remote": {
                "baseUrl": "http://localhost:8080/idb",
                "timeoutMs": 5000
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            IdbConfig {
                data_root: Some(PathBuf::from("/srv/idb")),
                remote: RemoteConfig {
                    base_url: "http://localhost:8080/idb".to_string(),
                    timeout_ms: 5000,
                },
            }
        );
        assert_eq!(result.root(), PathBuf::from("/srv/idb"));
    }

    #[test]
    fn load_returns_defaults_when_file_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = IdbConfig::load(&temp_dir.path().join("config.json")).unwrap();

        assert_eq!(config, IdbConfig::default());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ invalid").unwrap();

        let result = IdbConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[rstest]
    #[case(Some("/srv/xdg"), Some("/home/ops"), "/srv/xdg/idb-manager")]
    #[case(None, Some("/home/ops"), "/home/ops/.local/share/idb-manager")]
    #[case(None, None, "./idb-manager")]
    fn data_dir_resolution_order(
        #[case] xdg_data_home: Option<&str>,
        #[case] home_dir: Option<&str>,
        #[case] expected: &str,
    ) {
        let path = data_dir_with_env(xdg_data_home.map(String::from), home_dir.map(PathBuf::from));

        assert_eq!(path, PathBuf::from(expected));
    }
}
