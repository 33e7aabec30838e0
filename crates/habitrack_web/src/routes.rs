//! Route table and request logging.

use crate::error::WebError;
use crate::handlers::{account, dashboard, goals, habits};
use crate::state::AppState;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use std::time::Instant;

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(account::home).post(account::home_submit))
        .route("/login/", get(account::login_page).post(account::login))
        .route("/register/", get(account::login_page).post(account::register))
        .route("/logout/", get(account::logout).post(account::logout))
        .route(
            "/account/delete/",
            get(account::delete_account_page).post(account::delete_account),
        )
        .route("/dashboard/", get(dashboard::dashboard))
        .route("/habits/", get(habits::list))
        .route("/habits/add/", get(habits::add_page).post(habits::add))
        .route(
            "/habits/{id}/edit/",
            get(habits::edit_page).post(habits::edit),
        )
        .route(
            "/habits/{id}/delete/",
            get(habits::delete_page).post(habits::delete),
        )
        .route("/habits/{id}/progress/", get(habits::progress))
        .route(
            "/habits/{id}/progress/add/",
            get(habits::progress_add_page).post(habits::progress_add),
        )
        .route(
            "/habits/{id}/progress/{entry_id}/status/",
            post(habits::progress_status),
        )
        .route("/goals/", get(goals::list))
        .route("/goals/add/", get(goals::add_page).post(goals::add))
        .route("/goals/{id}/edit/", get(goals::edit_page).post(goals::edit))
        .route(
            "/goals/{id}/delete/",
            get(goals::delete_page).post(goals::delete),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn not_found() -> WebError {
    WebError::NotFound
}

/// Logs method, path (never the query or body), status and duration.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=web status=error method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=web status=ok method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    }
    response
}
