//! Registration, login and session use-cases.
//!
//! # Responsibility
//! - Validate new-account data and store only salted hashes.
//! - Authenticate returning users and bind sessions to them.
//!
//! Each flow is split so the argon2 work never runs while the store is
//! borrowed: `begin_*` reads the store, [`PendingRegistration::hash`] or
//! [`PendingLogin::verify`] touches only the hasher, `finish_*` writes the
//! store. [`AuthService::register`] and [`AuthService::login`] run the three
//! steps back to back for callers with no lock to release.
//!
//! # Invariants
//! - Anonymous -> (register | login) -> Authenticated -> (logout) ->
//!   Anonymous. Registration signs the new user in.
//! - Login failures are reported as `ServiceError::InvalidCredentials`
//!   whether the username exists or not.
//! - Passwords and session tokens are never logged.

use crate::model::user::{NewUser, User};
use crate::repo::session_repo::{SessionRepository, SessionToken};
use crate::repo::user_repo::UserRepository;
use crate::repo::CascadeReport;
use crate::service::access::{RequestContext, SessionUser};
use crate::service::password::CredentialHasher;
use crate::service::{ServiceError, ServiceResult, USERNAME_TAKEN};
use crate::validate::account::{LoginInput, RegistrationDraft, RegistrationInput};
use crate::validate::ValidationErrors;
use log::{info, warn};
use std::fmt::{Debug, Formatter};

/// A user together with the freshly issued session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: User,
    pub token: SessionToken,
}

impl AuthenticatedSession {
    pub fn context(&self) -> RequestContext {
        RequestContext::authenticated(SessionUser::from(&self.user))
    }
}

/// Validated registration whose username was free when checked.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    draft: RegistrationDraft,
}

impl PendingRegistration {
    /// Hashes the password; the only expensive step of registration.
    pub fn hash(self, hasher: &CredentialHasher) -> ServiceResult<NewUser> {
        let password_hash = hasher.hash(&self.draft.password)?;
        Ok(NewUser {
            username: self.draft.username,
            email: self.draft.email,
            password_hash,
        })
    }
}

/// Submitted password plus the stored account it claims, if any.
pub struct PendingLogin {
    password: String,
    user: Option<User>,
}

impl Debug for PendingLogin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLogin")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl PendingLogin {
    /// Checks the password. An unknown user still costs one verification.
    pub fn verify(self, hasher: &CredentialHasher) -> ServiceResult<User> {
        let verified = match self.user {
            Some(user) if hasher.verify(&self.password, &user.password_hash) => Some(user),
            Some(_) => None,
            None => {
                hasher.verify_missing_user(&self.password);
                None
            }
        };
        verified.ok_or_else(|| {
            warn!("event=user_login module=auth status=error reason=invalid_credentials");
            ServiceError::InvalidCredentials
        })
    }
}

/// Account and session service.
pub struct AuthService<'h, U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    hasher: &'h CredentialHasher,
}

impl<'h, U: UserRepository, S: SessionRepository> AuthService<'h, U, S> {
    pub fn new(users: U, sessions: S, hasher: &'h CredentialHasher) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    /// - `Validation` for missing fields, bad shapes, mismatched passwords or
    ///   a username that is already registered.
    pub fn register(&self, input: &RegistrationInput) -> ServiceResult<AuthenticatedSession> {
        let user = self.begin_registration(input)?.hash(self.hasher)?;
        self.finish_registration(&user)
    }

    /// Validates `input` and checks that the username is free.
    pub fn begin_registration(
        &self,
        input: &RegistrationInput,
    ) -> ServiceResult<PendingRegistration> {
        let draft = input.validate()?;
        if self.users.username_exists(&draft.username)? {
            return Err(ValidationErrors::single("username", USERNAME_TAKEN).into());
        }
        Ok(PendingRegistration { draft })
    }

    /// Stores the hashed account and opens its first session.
    ///
    /// A username taken since [`Self::begin_registration`] surfaces as the
    /// same validation error through the unique index.
    pub fn finish_registration(&self, new_user: &NewUser) -> ServiceResult<AuthenticatedSession> {
        let user = self.users.create_user(new_user)?;
        let token = self.sessions.create_session(user.id)?;
        info!(
            "event=user_register module=auth status=ok user_id={}",
            user.id
        );
        Ok(AuthenticatedSession { user, token })
    }

    /// Checks credentials and opens a session.
    pub fn login(&self, input: &LoginInput) -> ServiceResult<AuthenticatedSession> {
        let user = self.begin_login(input)?.verify(self.hasher)?;
        self.finish_login(user)
    }

    /// Validates `input` and loads the account it names.
    pub fn begin_login(&self, input: &LoginInput) -> ServiceResult<PendingLogin> {
        let (username, password) = input.validate()?;
        let user = self.users.find_by_username(&username)?;
        Ok(PendingLogin { password, user })
    }

    /// Opens a session for a user whose password was verified.
    pub fn finish_login(&self, user: User) -> ServiceResult<AuthenticatedSession> {
        let token = self.sessions.create_session(user.id)?;
        info!("event=user_login module=auth status=ok user_id={}", user.id);
        Ok(AuthenticatedSession { user, token })
    }

    /// Ends the session. Unknown tokens are ignored.
    pub fn logout(&self, token: &SessionToken) -> ServiceResult<()> {
        if self.sessions.delete_session(token)? {
            info!("event=user_logout module=auth status=ok");
        }
        Ok(())
    }

    /// Deletes the acting user together with every habit, progress entry,
    /// goal and session it owns.
    pub fn delete_account(&self, ctx: &RequestContext) -> ServiceResult<CascadeReport> {
        let user = ctx.require_user()?;
        Ok(self.users.delete_cascade(user.id)?)
    }
}

/// Builds the request context for an optional client token. Unknown or
/// stale tokens yield an anonymous context.
pub fn resolve_session(
    sessions: &impl SessionRepository,
    token: Option<&SessionToken>,
) -> ServiceResult<RequestContext> {
    let Some(token) = token else {
        return Ok(RequestContext::anonymous());
    };

    Ok(match sessions.find_user_by_token(token)? {
        Some(user) => RequestContext::authenticated(SessionUser::from(&user)),
        None => RequestContext::anonymous(),
    })
}
