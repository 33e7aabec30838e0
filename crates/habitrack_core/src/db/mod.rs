//! Tracker store bootstrap: connection setup and schema upgrades.
//!
//! Every repository in [`crate::repo`] expects a connection produced by
//! [`open_db`] or [`open_db_in_memory`]; those are the only places that
//! touch `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use migrations::MigrationReport;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or upgrading the tracker store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The directory that should hold the database file could not be made.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file was written by a newer build with more schema steps.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::CreateDir { path, source } => {
                write!(f, "cannot create `{}`: {source}", path.display())
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "tracker schema version {found} is newer than this build supports ({supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDir { source, .. } => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
