//! Core domain logic for habitrack.
//! This crate is the single source of truth for business invariants:
//! ownership, progress aggregation, account rules and storage layout.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validate;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::goal::Goal;
pub use model::habit::{Frequency, Habit, HabitProgress};
pub use model::user::{NewUser, User};
pub use model::{GoalId, HabitId, ProgressId, UserId};
pub use repo::goal_repo::{GoalRepository, SqliteGoalRepository};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::progress_repo::{ProgressRepository, SqliteProgressRepository};
pub use repo::session_repo::{SessionRepository, SessionToken, SqliteSessionRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{CascadeReport, RepoError, RepoResult};
pub use service::access::{
    authorize, ensure_owned, Owned, ProgressResource, RequestContext, SessionUser,
};
pub use service::auth_service::{
    resolve_session, AuthService, AuthenticatedSession, PendingLogin, PendingRegistration,
};
pub use service::dashboard::{build_dashboard, Dashboard};
pub use service::goal_service::GoalService;
pub use service::habit_service::HabitService;
pub use service::password::{CredentialHasher, HashingCost, PasswordError};
pub use service::progress::{completion_percent, current_streak, summarize, HabitSummary};
pub use service::{ServiceError, ServiceResult};
pub use validate::account::{LoginInput, RegistrationInput};
pub use validate::goal::GoalInput;
pub use validate::habit::HabitInput;
pub use validate::progress::ProgressInput;
pub use validate::{FieldError, ValidationErrors};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
