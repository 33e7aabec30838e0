//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `username` is unique; a duplicate insert yields
//!   `RepoError::UniqueViolation`.
//! - Deleting a user removes its sessions, goals, habits and their progress
//!   entries in the same transaction.

use crate::model::user::{NewUser, User};
use crate::model::UserId;
use crate::repo::{
    ensure_connection_ready, map_unique_violation, CascadeReport, RepoError, RepoResult,
};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Uniqueness key reported when a username is already registered.
pub const USERNAME_UNIQUE_KEY: &str = "users.username";

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    password_hash,
    created_at
FROM users";

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts a new account and returns the stored record.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Exact, case-sensitive lookup.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn username_exists(&self, username: &str) -> RepoResult<bool>;
    /// Deletes the user and everything it owns.
    fn delete_cascade(&self, id: UserId) -> RepoResult<CascadeReport>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users")?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let id: i64 = self
            .conn
            .query_row(
                "INSERT INTO users (username, email, password_hash)
                 VALUES (?1, ?2, ?3)
                 RETURNING id;",
                params![
                    user.username.as_str(),
                    user.email.as_str(),
                    user.password_hash.as_str(),
                ],
                |row| row.get(0),
            )
            .map_err(|err| map_unique_violation(err, USERNAME_UNIQUE_KEY))?;

        self.find_by_id(UserId(id))?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing after insert")))
    }

    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn username_exists(&self, username: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1;",
                [username],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn delete_cascade(&self, id: UserId) -> RepoResult<CascadeReport> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let progress_entries = tx.execute(
            "DELETE FROM habit_progress
             WHERE habit_id IN (SELECT id FROM habits WHERE user_id = ?1);",
            [id.get()],
        )?;
        let habits = tx.execute("DELETE FROM habits WHERE user_id = ?1;", [id.get()])?;
        let goals = tx.execute("DELETE FROM goals WHERE user_id = ?1;", [id.get()])?;
        let sessions = tx.execute("DELETE FROM sessions WHERE user_id = ?1;", [id.get()])?;
        let users = tx.execute("DELETE FROM users WHERE id = ?1;", [id.get()])?;

        if users == 0 {
            // Dropping `tx` rolls back.
            return Err(RepoError::NotFound {
                entity: "user",
                id: id.get(),
            });
        }
        tx.commit()?;

        let report = CascadeReport {
            habits,
            progress_entries,
            goals,
            sessions,
        };
        info!(
            "event=user_delete module=repo status=ok user_id={} habits={} progress_entries={} goals={} sessions={}",
            id, report.habits, report.progress_entries, report.goals, report.sessions
        );
        Ok(report)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: UserId(row.get("id")?),
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}
