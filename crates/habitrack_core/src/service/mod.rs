//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, ownership checks and repository calls into
//!   use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.
//!
//! # Invariants
//! - Every id-scoped operation loads the resource, passes it through the
//!   access guard, and only then reads further or mutates.
//! - A resource owned by someone else is reported exactly like a missing
//!   one (`ServiceError::NotFound`).

pub mod access;
pub mod auth_service;
pub mod dashboard;
pub mod goal_service;
pub mod habit_service;
pub mod password;
pub mod progress;

use crate::repo::progress_repo::PROGRESS_UNIQUE_KEY;
use crate::repo::user_repo::USERNAME_UNIQUE_KEY;
use crate::repo::RepoError;
use crate::validate::ValidationErrors;
use password::PasswordError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message shown when a progress entry already exists for the chosen date.
pub const PROGRESS_ALREADY_RECORDED: &str = "Progress already recorded for that date.";
/// Message shown when the requested username is registered already.
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
/// Generic login failure message. Never says which half was wrong.
pub const INVALID_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy surfaced to the HTTP layer.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or inconsistent input; recovered by re-rendering the form.
    Validation(ValidationErrors),
    /// Missing, or owned by another user.
    NotFound,
    /// The request carries no authenticated user.
    Unauthenticated,
    /// Login failed. Does not reveal whether the username exists.
    InvalidCredentials,
    Password(PasswordError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::NotFound => write!(f, "not found"),
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::InvalidCredentials => f.write_str(INVALID_CREDENTIALS),
            Self::Password(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Password(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFound,
            RepoError::UniqueViolation(key) if key == PROGRESS_UNIQUE_KEY => {
                Self::Validation(ValidationErrors::single("date", PROGRESS_ALREADY_RECORDED))
            }
            RepoError::UniqueViolation(key) if key == USERNAME_UNIQUE_KEY => {
                Self::Validation(ValidationErrors::single("username", USERNAME_TAKEN))
            }
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceError, PROGRESS_ALREADY_RECORDED};
    use crate::repo::progress_repo::PROGRESS_UNIQUE_KEY;
    use crate::repo::RepoError;

    #[test]
    fn progress_uniqueness_violation_becomes_date_validation_error() {
        let err = ServiceError::from(RepoError::UniqueViolation(PROGRESS_UNIQUE_KEY));
        match err {
            ServiceError::Validation(errors) => assert_eq!(
                errors.for_field("date").collect::<Vec<_>>(),
                vec![PROGRESS_ALREADY_RECORDED]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repo_not_found_becomes_generic_not_found() {
        let err = ServiceError::from(RepoError::NotFound {
            entity: "goal",
            id: 9,
        });
        assert!(matches!(err, ServiceError::NotFound));
    }
}
