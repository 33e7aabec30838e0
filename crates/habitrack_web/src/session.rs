//! Cookie-backed session context and one-shot flash messages.
//!
//! # Invariants
//! - The session cookie only ever carries the opaque token; the user is
//!   resolved server-side on every request.
//! - An unknown or stale token degrades to an anonymous context, never to
//!   an error page.

use crate::error::WebError;
use crate::render::Chrome;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use habitrack_core::{
    resolve_session, RequestContext, ServiceResult, SessionToken, SqliteSessionRepository,
};

pub const SESSION_COOKIE: &str = "habitrack_session";
pub const FLASH_COOKIE: &str = "habitrack_flash";

/// Confirmation shown once on the page a mutation redirects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    HabitCreated,
    HabitUpdated,
    HabitDeleted,
    ProgressSaved,
    GoalCreated,
    GoalUpdated,
    GoalDeleted,
    WelcomeBack,
    AccountCreated,
    LoggedOut,
    AccountDeleted,
}

impl Flash {
    const ALL: [Flash; 11] = [
        Self::HabitCreated,
        Self::HabitUpdated,
        Self::HabitDeleted,
        Self::ProgressSaved,
        Self::GoalCreated,
        Self::GoalUpdated,
        Self::GoalDeleted,
        Self::WelcomeBack,
        Self::AccountCreated,
        Self::LoggedOut,
        Self::AccountDeleted,
    ];

    /// Cookie-safe identifier.
    pub fn code(self) -> &'static str {
        match self {
            Self::HabitCreated => "habit_created",
            Self::HabitUpdated => "habit_updated",
            Self::HabitDeleted => "habit_deleted",
            Self::ProgressSaved => "progress_saved",
            Self::GoalCreated => "goal_created",
            Self::GoalUpdated => "goal_updated",
            Self::GoalDeleted => "goal_deleted",
            Self::WelcomeBack => "welcome_back",
            Self::AccountCreated => "account_created",
            Self::LoggedOut => "logged_out",
            Self::AccountDeleted => "account_deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::HabitCreated => "Habit created.",
            Self::HabitUpdated => "Habit updated.",
            Self::HabitDeleted => "Habit deleted.",
            Self::ProgressSaved => "Progress saved.",
            Self::GoalCreated => "Goal created.",
            Self::GoalUpdated => "Goal updated.",
            Self::GoalDeleted => "Goal deleted.",
            Self::WelcomeBack => "Welcome back!",
            Self::AccountCreated => "Account created successfully!",
            Self::LoggedOut => "You have been logged out.",
            Self::AccountDeleted => "Your account has been deleted.",
        }
    }
}

/// Request-scoped identity plus any pending flash message.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub ctx: RequestContext,
    /// Token as presented by the client, valid or not.
    pub token: Option<SessionToken>,
    pub flash: Option<Flash>,
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, SESSION_COOKIE).map(SessionToken::from_client);
        let flash = cookie_value(&parts.headers, FLASH_COOKIE)
            .as_deref()
            .and_then(Flash::from_code);

        let ctx = state.with_conn(|conn| -> ServiceResult<RequestContext> {
            let sessions = SqliteSessionRepository::try_new(conn)?;
            resolve_session(&sessions, token.as_ref())
        })??;

        Ok(Self { ctx, token, flash })
    }
}

impl SessionContext {
    pub fn chrome(&self) -> Chrome<'_> {
        Chrome {
            user: self.ctx.user(),
            flash: self.flash.map(Flash::message),
        }
    }

    /// Wraps a rendered page, consuming the pending flash message.
    pub fn page(&self, html: String) -> Response {
        let response = Html(html).into_response();
        if self.flash.is_some() {
            with_cookie(response, expired_cookie(FLASH_COOKIE))
        } else {
            response
        }
    }
}

/// Returns the first value of the named cookie.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &SessionToken, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax{secure}",
        token.as_str()
    )
}

pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn flash_cookie(flash: Flash) -> String {
    format!(
        "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        flash.code()
    )
}

/// Appends a `Set-Cookie` header.
pub fn with_cookie(mut response: Response, cookie: String) -> Response {
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

/// `303 See Other` to `location`, carrying a flash message.
pub fn redirect_with_flash(location: &str, flash: Flash) -> Response {
    with_cookie(Redirect::to(location).into_response(), flash_cookie(flash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_cookie_among_several_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; lang=en"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("habitrack_session=abc123; habitrack_flash=goal_created"),
        );

        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            cookie_value(&headers, FLASH_COOKIE).as_deref(),
            Some("goal_created")
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("habitrack_session="));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_optionally_secure() {
        let token = SessionToken::from_client("tok");
        let plain = session_cookie(&token, false);
        assert!(plain.starts_with("habitrack_session=tok;"));
        assert!(plain.contains("HttpOnly"));
        assert!(plain.contains("SameSite=Lax"));
        assert!(!plain.contains("Secure"));
        assert!(session_cookie(&token, true).ends_with("; Secure"));
    }

    #[test]
    fn flash_codes_round_trip() {
        for flash in Flash::ALL {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }
}
