//! Request-scoped identity and the ownership guard.
//!
//! # Invariants
//! - `authorize` is true only when the acting user owns the resource.
//!   Progress entries are owned through their habit.
//! - Callers turn a failed check into `ServiceError::NotFound`, never a
//!   distinct "forbidden" outcome.

use crate::model::goal::Goal;
use crate::model::habit::{Habit, HabitProgress};
use crate::model::user::User;
use crate::model::UserId;
use crate::service::{ServiceError, ServiceResult};
use log::debug;

/// Identity of the user bound to the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(value: &User) -> Self {
        Self {
            id: value.id,
            username: value.username.clone(),
        }
    }
}

/// Per-request context handed explicitly to every handler and service call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<SessionUser>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Returns the acting user or `ServiceError::Unauthenticated`.
    pub fn require_user(&self) -> ServiceResult<&SessionUser> {
        self.user.as_ref().ok_or(ServiceError::Unauthenticated)
    }
}

/// A record with an owning user.
pub trait Owned {
    /// `None` when ownership cannot be established.
    fn owner(&self) -> Option<UserId>;
}

impl Owned for Habit {
    fn owner(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

impl Owned for Goal {
    fn owner(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

impl<T: Owned> Owned for &T {
    fn owner(&self) -> Option<UserId> {
        (**self).owner()
    }
}

/// A progress entry viewed through the habit it claims to belong to.
#[derive(Debug, Clone, Copy)]
pub struct ProgressResource<'a> {
    pub habit: &'a Habit,
    pub entry: &'a HabitProgress,
}

impl Owned for ProgressResource<'_> {
    fn owner(&self) -> Option<UserId> {
        if self.entry.habit_id == self.habit.id {
            Some(self.habit.user_id)
        } else {
            None
        }
    }
}

/// Returns whether `user` may read or mutate `resource`.
pub fn authorize(user: &SessionUser, resource: &impl Owned) -> bool {
    resource.owner() == Some(user.id)
}

/// Passes an owned resource through and reports anything else, missing or
/// foreign, as `ServiceError::NotFound`.
pub fn ensure_owned<T: Owned>(user: &SessionUser, resource: Option<T>) -> ServiceResult<T> {
    match resource {
        Some(resource) if authorize(user, &resource) => Ok(resource),
        Some(_) => {
            debug!(
                "event=access_check module=auth status=denied user_id={}",
                user.id
            );
            Err(ServiceError::NotFound)
        }
        None => Err(ServiceError::NotFound),
    }
}
