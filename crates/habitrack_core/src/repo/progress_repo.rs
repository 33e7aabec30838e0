//! Habit progress repository contract and SQLite implementation.
//!
//! # Invariants
//! - `(habit_id, date)` is unique at the storage layer. Two concurrent
//!   inserts for the same pair leave exactly one row; the loser receives
//!   `RepoError::UniqueViolation`.

use crate::model::habit::HabitProgress;
use crate::model::{HabitId, ProgressId, UserId};
use crate::repo::{
    bool_to_int, date_to_db, ensure_connection_ready, int_to_bool, map_unique_violation,
    parse_db_date, RepoError, RepoResult,
};
use crate::validate::progress::ProgressDraft;
use rusqlite::{params, Connection, Row};

/// Uniqueness key reported when a date is already recorded for a habit.
pub const PROGRESS_UNIQUE_KEY: &str = "habit_progress(habit_id, date)";

const PROGRESS_SELECT_SQL: &str = "SELECT
    habit_progress.id AS id,
    habit_progress.habit_id AS habit_id,
    habit_progress.date AS date,
    habit_progress.status AS status
FROM habit_progress";

/// Repository interface for habit progress entries.
pub trait ProgressRepository {
    /// Inserts one dated entry for a habit.
    fn record_progress(&self, habit: HabitId, draft: &ProgressDraft) -> RepoResult<HabitProgress>;
    fn find_by_id(&self, id: ProgressId) -> RepoResult<Option<HabitProgress>>;
    /// Lists a habit's entries, most recent date first.
    fn list_for_habit(&self, habit: HabitId) -> RepoResult<Vec<HabitProgress>>;
    /// Lists every entry of every habit owned by `owner`.
    fn list_for_owner(&self, owner: UserId) -> RepoResult<Vec<HabitProgress>>;
    fn set_status(&self, id: ProgressId, status: bool) -> RepoResult<HabitProgress>;
}

/// SQLite-backed progress repository.
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "habit_progress")?;
        Ok(Self { conn })
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn record_progress(&self, habit: HabitId, draft: &ProgressDraft) -> RepoResult<HabitProgress> {
        let id: i64 = self
            .conn
            .query_row(
                "INSERT INTO habit_progress (habit_id, date, status)
                 VALUES (?1, ?2, ?3)
                 RETURNING id;",
                params![habit.get(), date_to_db(draft.date), bool_to_int(draft.status)],
                |row| row.get(0),
            )
            .map_err(|err| map_unique_violation(err, PROGRESS_UNIQUE_KEY))?;

        Ok(HabitProgress {
            id: ProgressId(id),
            habit_id: habit,
            date: draft.date,
            status: draft.status,
        })
    }

    fn find_by_id(&self, id: ProgressId) -> RepoResult<Option<HabitProgress>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROGRESS_SELECT_SQL} WHERE habit_progress.id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_progress_row(row)?));
        }
        Ok(None)
    }

    fn list_for_habit(&self, habit: HabitId) -> RepoResult<Vec<HabitProgress>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROGRESS_SELECT_SQL}
             WHERE habit_progress.habit_id = ?1
             ORDER BY habit_progress.date DESC, habit_progress.id DESC;"
        ))?;
        let rows = collect_rows(stmt.query([habit.get()])?);
        rows
    }

    fn list_for_owner(&self, owner: UserId) -> RepoResult<Vec<HabitProgress>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROGRESS_SELECT_SQL}
             JOIN habits ON habits.id = habit_progress.habit_id
             WHERE habits.user_id = ?1
             ORDER BY habit_progress.habit_id ASC, habit_progress.date DESC;"
        ))?;
        let rows = collect_rows(stmt.query([owner.get()])?);
        rows
    }

    fn set_status(&self, id: ProgressId, status: bool) -> RepoResult<HabitProgress> {
        let changed = self.conn.execute(
            "UPDATE habit_progress SET status = ?2 WHERE id = ?1;",
            params![id.get(), bool_to_int(status)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "habit progress",
                id: id.get(),
            });
        }
        self.find_by_id(id)?.ok_or(RepoError::NotFound {
            entity: "habit progress",
            id: id.get(),
        })
    }
}

fn collect_rows(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<HabitProgress>> {
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(parse_progress_row(row)?);
    }
    Ok(entries)
}

fn parse_progress_row(row: &Row<'_>) -> RepoResult<HabitProgress> {
    let date_text: String = row.get("date")?;
    Ok(HabitProgress {
        id: ProgressId(row.get("id")?),
        habit_id: HabitId(row.get("habit_id")?),
        date: parse_db_date(&date_text, "habit_progress.date")?,
        status: int_to_bool(row.get("status")?, "habit_progress.status")?,
    })
}
