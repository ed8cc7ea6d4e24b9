//! SQLite storage bootstrap and schema lifecycle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the pet store.
//! - Create or destructively upgrade the `pets` table to the expected version.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - The physical layout always matches the stamped version.
//! - Callers must not read/write pet data before the schema is prepared.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::open_connection;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Lifecycle state of the storage behind a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// No storage attached yet.
    Absent,
    Creating,
    Upgrading,
    Ready,
    /// Terminal. Recovery means deleting the storage file.
    Fatal,
    /// Explicitly closed by the owner; may be opened again.
    Closed,
}

impl SchemaState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Creating => "creating",
            Self::Upgrading => "upgrading",
            Self::Ready => "ready",
            Self::Fatal => "fatal",
            Self::Closed => "closed",
        }
    }
}

impl Display for SchemaState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition taken while bringing storage to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Fresh storage; the table was created.
    Created { version: u32 },
    /// Older storage; the table was dropped and recreated.
    Upgraded { from: u32, to: u32 },
    /// Storage already matched the expected version.
    Opened { version: u32 },
}
