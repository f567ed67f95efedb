//! Connection to one version-specific IDB file
//!
//! A handle moves through `Created -> Open -> Closed` and never returns from
//! `Closed`. [`IdbGuard`] closes its handle when it goes out of scope, on
//! every exit path.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};

use crate::idb::error::IdbError;
use crate::idb::version::VersionId;

#[derive(Debug)]
enum State {
    Created,
    Open(Connection),
    Closed,
}

#[derive(Debug)]
pub struct IdbHandle {
    version: VersionId,
    path: PathBuf,
    state: State,
}

impl IdbHandle {
    /// Create an unopened handle for the artifact at `path`
    pub fn new(version: VersionId, path: impl Into<PathBuf>) -> Self {
        Self {
            version,
            path: path.into(),
            state: State::Created,
        }
    }

    /// Open the database read-only; no-op if already open
    pub fn open(&mut self) -> Result<(), IdbError> {
        match self.state {
            State::Open(_) => return Ok(()),
            State::Closed => return Err(IdbError::HandleClosed(self.version)),
            State::Created => {}
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        // Opening is lazy; touch the schema so an unreadable file fails here
        let schema_version: i64 =
            conn.pragma_query_value(None, "schema_version", |row| row.get(0))?;

        debug!(
            "Opened IDB {} at {:?} (schema version {})",
            self.version, self.path, schema_version
        );
        self.state = State::Open(conn);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn version_label(&self) -> VersionId {
        self.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The open connection, for decoders working on the database contents
    pub fn connection(&self) -> Result<&Connection, IdbError> {
        match &self.state {
            State::Open(conn) => Ok(conn),
            _ => Err(IdbError::NotConnected(self.version)),
        }
    }

    /// Names of the tables in the database, sorted
    pub fn table_names(&self) -> Result<Vec<String>, IdbError> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Release the connection; idempotent
    ///
    /// The handle is closed afterwards even if SQLite reports an error.
    pub fn close(&mut self) -> Result<(), IdbError> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(conn) => {
                info!("Closing IDB {}", self.version);
                conn.close().map_err(|(_, e)| IdbError::Database(e))
            }
            State::Created | State::Closed => Ok(()),
        }
    }

    /// Wrap the handle so it is closed when the guard is dropped
    pub fn scoped(self) -> IdbGuard {
        IdbGuard { handle: self }
    }
}

/// Scoped owner of an [`IdbHandle`]
#[derive(Debug)]
pub struct IdbGuard {
    handle: IdbHandle,
}

impl Deref for IdbGuard {
    type Target = IdbHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl DerefMut for IdbGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.handle
    }
}

impl Drop for IdbGuard {
    fn drop(&mut self) {
        if let Err(e) = self.handle.close() {
            warn!("Failed to close IDB {}: {}", self.handle.version, e);
        }
    }
}
