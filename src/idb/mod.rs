//! Version manager for the instrument database (IDB)
//!
//! Tracks which IDB releases are installed under a root directory, maps a UTC
//! timestamp to the release valid at that time, downloads missing releases
//! and hands out connections to the version-specific SQLite files.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Downloader │────▶│   Catalog   │◀────│  Resolver   │
//! │  (install)  │     │   (scan)    │     │ (time→ver)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │     │   History   │     │  IdbHandle  │
//! │   (http)    │     │ (validity)  │     │  (sqlite)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Scan of the root into complete/incomplete version records
//! - [`downloader`]: Staged, atomic installation of remote versions
//! - [`error`]: Error types for manager, fetch and config operations
//! - [`fetcher`]: Fetcher trait for remote IDB repositories
//! - [`fetchers`]: Concrete fetchers (HTTP)
//! - [`handle`]: Connection lifecycle and scoped guard
//! - [`history`]: Validity periods of each version
//! - [`manager`]: The `IdbManager` facade
//! - [`resolver`]: Timestamp/label to version resolution
//! - [`version`]: Canonical `VersionId` and label normalization

pub mod catalog;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod fetchers;
pub mod handle;
pub mod history;
pub mod manager;
pub mod resolver;
pub mod version;

pub use error::IdbError;
pub use handle::{IdbGuard, IdbHandle};
pub use manager::IdbManager;
pub use resolver::IdbSelector;
pub use version::VersionId;
