//! Route handlers.
//!
//! Each handler extracts the session context, runs its service calls under
//! the connection lock, and turns the outcome into a page, a redirect, or a
//! [`WebError`]. Login and registration release the lock while the password
//! is hashed or verified.

pub mod account;
pub mod dashboard;
pub mod goals;
pub mod habits;

use crate::error::{WebError, WebResult};
use chrono::{Local, NaiveDate};
use habitrack_core::{
    AuthService, CredentialHasher, GoalService, HabitService, ServiceResult,
    SqliteGoalRepository, SqliteHabitRepository, SqliteProgressRepository,
    SqliteSessionRepository, SqliteUserRepository,
};
use rusqlite::Connection;

pub(crate) type SqliteHabitService<'c> =
    HabitService<SqliteHabitRepository<'c>, SqliteProgressRepository<'c>>;
pub(crate) type SqliteGoalService<'c> = GoalService<SqliteGoalRepository<'c>>;
pub(crate) type SqliteAuthService<'c> =
    AuthService<'c, SqliteUserRepository<'c>, SqliteSessionRepository<'c>>;

pub(crate) fn habit_service(conn: &Connection) -> ServiceResult<SqliteHabitService<'_>> {
    Ok(HabitService::new(
        SqliteHabitRepository::try_new(conn)?,
        SqliteProgressRepository::try_new(conn)?,
    ))
}

pub(crate) fn goal_service(conn: &Connection) -> ServiceResult<SqliteGoalService<'_>> {
    Ok(GoalService::new(SqliteGoalRepository::try_new(conn)?))
}

pub(crate) fn auth_service<'c>(
    conn: &'c Connection,
    hasher: &'c CredentialHasher,
) -> ServiceResult<SqliteAuthService<'c>> {
    Ok(AuthService::new(
        SqliteUserRepository::try_new(conn)?,
        SqliteSessionRepository::try_new(conn)?,
        hasher,
    ))
}

/// Server-local calendar date.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Path ids that are not integers name no resource.
pub(crate) fn parse_id(raw: &str) -> WebResult<i64> {
    raw.parse::<i64>().map_err(|_| WebError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::parse_id;
    use crate::error::WebError;

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert_eq!(parse_id("17").unwrap(), 17);
        assert!(matches!(parse_id("abc"), Err(WebError::NotFound)));
        assert!(matches!(parse_id(""), Err(WebError::NotFound)));
    }
}
