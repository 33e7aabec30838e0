//! Ordered schema steps for the tracker store.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly 1.
//! - The highest applied step is stored in `PRAGMA user_version`.
//! - Foreign keys carry no `ON DELETE CASCADE`; dependent rows are removed by
//!   the repositories' explicit cascade operations.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    label: &'static str,
    script: &'static str,
}

static STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        label: "tracker_entities",
        script: include_str!("0001_tracker_entities.sql"),
    },
    SchemaStep {
        version: 2,
        label: "sessions",
        script: include_str!("0002_sessions.sql"),
    },
];

/// Outcome of bringing a store up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub from: u32,
    pub to: u32,
}

impl MigrationReport {
    /// Number of schema steps run by this upgrade.
    pub fn applied(&self) -> u32 {
        self.to - self.from
    }
}

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the store.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Runs every step newer than the store's recorded version in one
/// transaction.
///
/// A store written by a newer build is refused untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let found = current_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let report = MigrationReport {
        from: found,
        to: supported,
    };
    if report.applied() == 0 {
        return Ok(report);
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > found) {
        tx.execute_batch(step.script)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} label={}",
            step.version, step.label
        );
    }
    tx.commit()?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, STEPS};

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.label);
        }
        assert_eq!(latest_version(), STEPS.len() as u32);
    }
}
