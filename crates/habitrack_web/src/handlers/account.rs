//! Home page, registration, login, logout and account deletion.

use crate::error::WebResult;
use crate::handlers::auth_service;
use crate::handlers::dashboard::render_dashboard;
use crate::render;
use crate::session::{
    expired_cookie, redirect_with_flash, session_cookie, with_cookie, Flash, SessionContext,
    SESSION_COOKIE,
};
use crate::state::AppState;
use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect, Response};
use habitrack_core::service::INVALID_CREDENTIALS;
use habitrack_core::{
    AuthenticatedSession, LoginInput, RegistrationInput, ServiceError, ServiceResult,
    ValidationErrors,
};
use serde::Deserialize;

/// Combined home page submission; the `login` or `register` submit button
/// decides which form was sent.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct HomeForm {
    pub login: Option<String>,
    pub register: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

pub async fn home(State(state): State<AppState>, session: SessionContext) -> WebResult<Response> {
    if session.ctx.is_authenticated() {
        return render_dashboard(&state, &session);
    }
    Ok(anonymous_page(&session, &LoginInput::default(), None, &RegistrationInput::default(), None))
}

pub async fn home_submit(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<HomeForm>,
) -> WebResult<Response> {
    if form.login.is_some() {
        return sign_in(
            &state,
            &session,
            LoginInput {
                username: form.username,
                password: form.password,
            },
        )
        .await;
    }
    if form.register.is_some() {
        return sign_up(
            &state,
            &session,
            RegistrationInput {
                username: form.username,
                email: form.email,
                password: form.password,
                password_confirm: form.password_confirm,
            },
        )
        .await;
    }
    Ok(Redirect::to("/").into_response())
}

/// Login and registration forms; signed-in visitors go to their dashboard.
pub async fn login_page(session: SessionContext) -> Response {
    if session.ctx.is_authenticated() {
        return Redirect::to("/dashboard/").into_response();
    }
    anonymous_page(&session, &LoginInput::default(), None, &RegistrationInput::default(), None)
}

pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    Form(input): Form<LoginInput>,
) -> WebResult<Response> {
    sign_in(&state, &session, input).await
}

pub async fn register(
    State(state): State<AppState>,
    session: SessionContext,
    Form(input): Form<RegistrationInput>,
) -> WebResult<Response> {
    sign_up(&state, &session, input).await
}

pub async fn logout(State(state): State<AppState>, session: SessionContext) -> WebResult<Response> {
    if let Some(token) = &session.token {
        state.with_conn(|conn| -> ServiceResult<()> {
            auth_service(conn, state.hasher())?.logout(token)
        })??;
    }
    Ok(with_cookie(
        redirect_with_flash("/", Flash::LoggedOut),
        expired_cookie(SESSION_COOKIE),
    ))
}

pub async fn delete_account_page(session: SessionContext) -> WebResult<Response> {
    let user = session.ctx.require_user()?;
    let html = render::confirm_delete(
        session.chrome(),
        "Delete account",
        &user.username,
        "/account/delete/",
        "/dashboard/",
    );
    Ok(session.page(html))
}

/// Removes the user with every habit, progress entry, goal and session.
pub async fn delete_account(
    State(state): State<AppState>,
    session: SessionContext,
) -> WebResult<Response> {
    state.with_conn(|conn| -> ServiceResult<_> {
        auth_service(conn, state.hasher())?.delete_account(&session.ctx)
    })??;
    Ok(with_cookie(
        redirect_with_flash("/", Flash::AccountDeleted),
        expired_cookie(SESSION_COOKIE),
    ))
}

async fn sign_in(
    state: &AppState,
    session: &SessionContext,
    input: LoginInput,
) -> WebResult<Response> {
    let errors = match authenticate(state, &input).await? {
        Ok(signed_in) => return Ok(signed_in_redirect(state, &signed_in, Flash::WelcomeBack)),
        Err(ServiceError::Validation(errors)) => errors,
        Err(ServiceError::InvalidCredentials) => ValidationErrors::form(INVALID_CREDENTIALS),
        Err(err) => return Err(err.into()),
    };
    let input = LoginInput {
        username: input.username,
        password: String::new(),
    };
    Ok(anonymous_page(session, &input, Some(&errors), &RegistrationInput::default(), None))
}

async fn sign_up(
    state: &AppState,
    session: &SessionContext,
    input: RegistrationInput,
) -> WebResult<Response> {
    let errors = match enroll(state, &input).await? {
        Ok(signed_in) => return Ok(signed_in_redirect(state, &signed_in, Flash::AccountCreated)),
        Err(ServiceError::Validation(errors)) => errors,
        Err(err) => return Err(err.into()),
    };
    let input = RegistrationInput {
        username: input.username,
        email: input.email,
        password: String::new(),
        password_confirm: String::new(),
    };
    Ok(anonymous_page(session, &LoginInput::default(), None, &input, Some(&errors)))
}

/// Lookup under the lock, verification on the blocking pool, session
/// insert under the lock again.
async fn authenticate(
    state: &AppState,
    input: &LoginInput,
) -> WebResult<ServiceResult<AuthenticatedSession>> {
    let pending = state.with_conn(|conn| -> ServiceResult<_> {
        auth_service(conn, state.hasher())?.begin_login(input)
    })?;
    let verified = match pending {
        Ok(pending) => state.with_hasher(move |hasher| pending.verify(hasher)).await?,
        Err(err) => return Ok(Err(err)),
    };
    match verified {
        Ok(user) => state.with_conn(|conn| -> ServiceResult<_> {
            auth_service(conn, state.hasher())?.finish_login(user)
        }),
        Err(err) => Ok(Err(err)),
    }
}

/// Availability check under the lock, hashing on the blocking pool, insert
/// under the lock again.
async fn enroll(
    state: &AppState,
    input: &RegistrationInput,
) -> WebResult<ServiceResult<AuthenticatedSession>> {
    let pending = state.with_conn(|conn| -> ServiceResult<_> {
        auth_service(conn, state.hasher())?.begin_registration(input)
    })?;
    let hashed = match pending {
        Ok(pending) => state.with_hasher(move |hasher| pending.hash(hasher)).await?,
        Err(err) => return Ok(Err(err)),
    };
    match hashed {
        Ok(new_user) => state.with_conn(|conn| -> ServiceResult<_> {
            auth_service(conn, state.hasher())?.finish_registration(&new_user)
        }),
        Err(err) => Ok(Err(err)),
    }
}

fn signed_in_redirect(state: &AppState, signed_in: &AuthenticatedSession, flash: Flash) -> Response {
    with_cookie(
        redirect_with_flash("/dashboard/", flash),
        session_cookie(&signed_in.token, state.secure_cookies()),
    )
}

fn anonymous_page(
    session: &SessionContext,
    login: &LoginInput,
    login_errors: Option<&ValidationErrors>,
    registration: &RegistrationInput,
    registration_errors: Option<&ValidationErrors>,
) -> Response {
    session.page(render::home_anonymous(
        session.chrome(),
        login,
        login_errors,
        registration,
        registration_errors,
    ))
}
