//! Session repository contract and SQLite implementation.
//!
//! A session binds an opaque random token (held by the browser) to one user.

use crate::model::user::User;
use crate::model::UserId;
use crate::repo::{ensure_connection_ready, RepoResult};
use rusqlite::{params, Connection, Row};
use std::fmt::{Debug, Formatter};
use uuid::Uuid;

/// Opaque session token. Redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps a token received from a client.
    pub fn from_client(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Repository interface for login sessions.
pub trait SessionRepository {
    fn create_session(&self, user: UserId) -> RepoResult<SessionToken>;
    /// Resolves a token to its user; unknown tokens yield `None`.
    fn find_user_by_token(&self, token: &SessionToken) -> RepoResult<Option<User>>;
    /// Returns whether a session row was removed.
    fn delete_session(&self, token: &SessionToken) -> RepoResult<bool>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "sessions")?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn create_session(&self, user: UserId) -> RepoResult<SessionToken> {
        let token = SessionToken::generate();
        self.conn.execute(
            "INSERT INTO sessions (token, user_id) VALUES (?1, ?2);",
            params![token.as_str(), user.get()],
        )?;
        Ok(token)
    }

    fn find_user_by_token(&self, token: &SessionToken) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                users.id AS id,
                users.username AS username,
                users.email AS email,
                users.password_hash AS password_hash,
                users.created_at AS created_at
             FROM sessions
             JOIN users ON users.id = sessions.user_id
             WHERE sessions.token = ?1;",
        )?;
        let mut rows = stmt.query([token.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_session_user(row)?));
        }
        Ok(None)
    }

    fn delete_session(&self, token: &SessionToken) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1;", [token.as_str()])?;
        Ok(changed > 0)
    }
}

fn parse_session_user(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: UserId(row.get("id")?),
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::SessionToken;

    #[test]
    fn generated_tokens_are_unique_and_hidden_from_debug() {
        let first = SessionToken::generate();
        let second = SessionToken::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
        assert!(!format!("{first:?}").contains(first.as_str()));
    }
}
