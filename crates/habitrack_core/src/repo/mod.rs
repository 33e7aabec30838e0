//! Entity stores over a migrated tracker connection.
//!
//! One trait plus one `Sqlite*Repository` per entity: users, sessions,
//! habits, progress entries and goals. SQL stays inside this module tree.
//!
//! # Invariants
//! - A store refuses a connection whose schema is not at the latest version.
//! - Cascade deletes run in one immediate transaction: either every
//!   dependent row goes or none does.
//! - Rows that do not decode (bad date, flag or frequency) are reported as
//!   `RepoError::InvalidData`, never silently patched.

pub mod goal_repo;
pub mod habit_repo;
pub mod progress_repo;
pub mod session_repo;
pub mod user_repo;

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use chrono::NaiveDate;
use rusqlite::{ffi, Connection, OptionalExtension};
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by every entity store.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No row with this id exists.
    NotFound { entity: &'static str, id: i64 },
    /// Insert or update would break the named uniqueness key.
    UniqueViolation(&'static str),
    InvalidData(String),
    /// The connection was not opened through `db::open_db*`.
    SchemaMismatch { expected: u32, found: u32 },
    MissingTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => Display::fmt(err, f),
            Self::NotFound { entity, id } => write!(f, "no {entity} with id {id}"),
            Self::UniqueViolation(key) => write!(f, "duplicate value for {key}"),
            Self::InvalidData(message) => write!(f, "stored row does not decode: {message}"),
            Self::SchemaMismatch { expected, found } => write!(
                f,
                "tracker schema is at version {found}, stores need version {expected}"
            ),
            Self::MissingTable(table) => write!(f, "tracker table `{table}` is missing"),
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::Sqlite(value).into()
    }
}

/// Rows removed by a user cascade delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub habits: usize,
    pub progress_entries: usize,
    pub goals: usize,
    pub sessions: usize,
}

/// Gate used by every `try_new`: schema at the latest version and `table`
/// present.
pub(crate) fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected = latest_version();
    let found = current_version(conn)?;
    if found != expected {
        return Err(RepoError::SchemaMismatch { expected, found });
    }

    conn.query_row(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get::<_, String>(0),
    )
    .optional()?
    .map(|_| ())
    .ok_or(RepoError::MissingTable(table))
}

/// Maps a uniqueness failure to `RepoError::UniqueViolation(key)`; other
/// errors pass through as `RepoError::Db`.
pub(crate) fn map_unique_violation(err: rusqlite::Error, key: &'static str) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::UniqueViolation(key)
    } else {
        err.into()
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || inner.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_db_date(value: &str, column: &'static str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}
