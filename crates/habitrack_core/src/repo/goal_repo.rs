//! Goal repository contract and SQLite implementation.

use crate::model::goal::{Goal, MAX_PROGRESS_PERCENTAGE};
use crate::model::{GoalId, UserId};
use crate::repo::{
    bool_to_int, date_to_db, ensure_connection_ready, int_to_bool, parse_db_date, RepoError,
    RepoResult,
};
use crate::validate::goal::GoalDraft;
use rusqlite::{params, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    description,
    target_date,
    is_completed,
    progress_percentage,
    progress_notes
FROM goals";

/// Repository interface for goals.
pub trait GoalRepository {
    fn create_goal(&self, owner: UserId, draft: &GoalDraft) -> RepoResult<Goal>;
    fn find_by_id(&self, id: GoalId) -> RepoResult<Option<Goal>>;
    /// Lists the owner's goals, latest target date first.
    fn find_by_owner(&self, owner: UserId) -> RepoResult<Vec<Goal>>;
    /// Replaces every user-editable field. Last write wins.
    fn update_goal(&self, id: GoalId, draft: &GoalDraft) -> RepoResult<Goal>;
    fn delete_goal(&self, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "goals")?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, owner: UserId, draft: &GoalDraft) -> RepoResult<Goal> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO goals (
                user_id,
                title,
                description,
                target_date,
                is_completed,
                progress_percentage,
                progress_notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id;",
            params![
                owner.get(),
                draft.title.as_str(),
                draft.description.as_str(),
                date_to_db(draft.target_date),
                bool_to_int(draft.is_completed),
                i64::from(draft.progress_percentage),
                draft.progress_notes.as_str(),
            ],
            |row| row.get(0),
        )?;

        Ok(goal_from_draft(GoalId(id), owner, draft))
    }

    fn find_by_id(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn find_by_owner(&self, owner: UserId) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY target_date DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([owner.get()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn update_goal(&self, id: GoalId, draft: &GoalDraft) -> RepoResult<Goal> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET
                title = ?2,
                description = ?3,
                target_date = ?4,
                is_completed = ?5,
                progress_percentage = ?6,
                progress_notes = ?7
             WHERE id = ?1;",
            params![
                id.get(),
                draft.title.as_str(),
                draft.description.as_str(),
                date_to_db(draft.target_date),
                bool_to_int(draft.is_completed),
                i64::from(draft.progress_percentage),
                draft.progress_notes.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "goal",
                id: id.get(),
            });
        }

        self.find_by_id(id)?.ok_or(RepoError::NotFound {
            entity: "goal",
            id: id.get(),
        })
    }

    fn delete_goal(&self, id: GoalId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1;", [id.get()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "goal",
                id: id.get(),
            });
        }
        Ok(())
    }
}

fn goal_from_draft(id: GoalId, owner: UserId, draft: &GoalDraft) -> Goal {
    Goal {
        id,
        user_id: owner,
        title: draft.title.clone(),
        description: draft.description.clone(),
        target_date: draft.target_date,
        is_completed: draft.is_completed,
        progress_percentage: draft.progress_percentage,
        progress_notes: draft.progress_notes.clone(),
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let target_text: String = row.get("target_date")?;
    let percentage: i64 = row.get("progress_percentage")?;
    let progress_percentage = u8::try_from(percentage)
        .ok()
        .filter(|value| *value <= MAX_PROGRESS_PERCENTAGE)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid percentage `{percentage}` in goals.progress_percentage"
            ))
        })?;

    Ok(Goal {
        id: GoalId(row.get("id")?),
        user_id: UserId(row.get("user_id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        target_date: parse_db_date(&target_text, "goals.target_date")?,
        is_completed: int_to_bool(row.get("is_completed")?, "goals.is_completed")?,
        progress_percentage,
        progress_notes: row.get("progress_notes")?,
    })
}
