//! Habit repository contract and SQLite implementation.
//!
//! # Invariants
//! - `user_id` and `created_at` are written once on insert; updates only
//!   touch title, description and frequency.
//! - `delete_cascade` removes the habit's progress entries before the habit.

use crate::model::habit::{Frequency, Habit};
use crate::model::{HabitId, UserId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use crate::validate::habit::HabitDraft;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    frequency,
    created_at
FROM habits";

/// Repository interface for habits.
pub trait HabitRepository {
    fn create_habit(&self, owner: UserId, draft: &HabitDraft) -> RepoResult<Habit>;
    fn find_by_id(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Lists the owner's habits, newest first.
    fn find_by_owner(&self, owner: UserId) -> RepoResult<Vec<Habit>>;
    fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> RepoResult<Habit>;
    /// Deletes the habit and its progress entries; returns how many entries
    /// were removed.
    fn delete_cascade(&self, id: HabitId) -> RepoResult<usize>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "habits")?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, owner: UserId, draft: &HabitDraft) -> RepoResult<Habit> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO habits (user_id, title, description, frequency)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id;",
            params![
                owner.get(),
                draft.title.as_str(),
                draft.description.as_str(),
                draft.frequency.as_str(),
            ],
            |row| row.get(0),
        )?;

        self.find_by_id(HabitId(id))?
            .ok_or_else(|| RepoError::InvalidData(format!("habit {id} missing after insert")))
    }

    fn find_by_id(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }
        Ok(None)
    }

    fn find_by_owner(&self, owner: UserId) -> RepoResult<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HABIT_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([owner.get()])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }
        Ok(habits)
    }

    fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> RepoResult<Habit> {
        let changed = self.conn.execute(
            "UPDATE habits
             SET
                title = ?2,
                description = ?3,
                frequency = ?4
             WHERE id = ?1;",
            params![
                id.get(),
                draft.title.as_str(),
                draft.description.as_str(),
                draft.frequency.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "habit",
                id: id.get(),
            });
        }

        self.find_by_id(id)?.ok_or(RepoError::NotFound {
            entity: "habit",
            id: id.get(),
        })
    }

    fn delete_cascade(&self, id: HabitId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed_entries =
            tx.execute("DELETE FROM habit_progress WHERE habit_id = ?1;", [id.get()])?;
        let removed_habits = tx.execute("DELETE FROM habits WHERE id = ?1;", [id.get()])?;
        if removed_habits == 0 {
            return Err(RepoError::NotFound {
                entity: "habit",
                id: id.get(),
            });
        }
        tx.commit()?;
        Ok(removed_entries)
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let frequency_text: String = row.get("frequency")?;
    let frequency = Frequency::parse(&frequency_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in habits.frequency"
        ))
    })?;

    Ok(Habit {
        id: HabitId(row.get("id")?),
        user_id: UserId(row.get("user_id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        frequency,
        created_at: row.get("created_at")?,
    })
}
