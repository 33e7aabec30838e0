//! Opening the tracker store.
//!
//! # Invariants
//! - Returned connections enforce foreign keys.
//! - Returned connections are at [`super::migrations::latest_version`].

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a writer waits on another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the tracker store at `path` and upgrades it.
///
/// Missing parent directories are created. File stores run in WAL mode so
/// readers are not blocked by the single writer.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    let result = ensure_parent_dir(path)
        .and_then(|()| Connection::open(path).map_err(DbError::from))
        .and_then(|mut conn| {
            let mode: String =
                conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            prepare(&mut conn, &mode)?;
            Ok(conn)
        });
    log_open(&path.display().to_string(), started_at, &result);
    result
}

/// Opens a private in-memory tracker store, already upgraded.
///
/// Each call returns an independent, empty store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            prepare(&mut conn, "memory")?;
            Ok(conn)
        });
    log_open(":memory:", started_at, &result);
    result
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn prepare(conn: &mut Connection, journal: &str) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let report = apply_migrations(conn)?;
    info!(
        "event=db_schema module=db status=ok journal={journal} from_version={} to_version={}",
        report.from, report.to
    );
    Ok(())
}

fn log_open(target: &str, started_at: Instant, result: &DbResult<Connection>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!("event=db_open module=db status=ok target={target} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error target={target} duration_ms={duration_ms} error={err}"
        ),
    }
}
