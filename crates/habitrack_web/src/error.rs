//! Request failure mapping.
//!
//! Validation problems never reach this type; handlers re-render their form
//! for those. What is left is either a generic 404, a login redirect, or a
//! logged 500.

use crate::render;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use habitrack_core::{RepoError, ServiceError};
use log::error;

pub type WebResult<T> = Result<T, WebError>;

#[derive(Debug)]
pub enum WebError {
    /// Missing, foreign, or unparseable resource id.
    NotFound,
    Unauthenticated,
    Internal(String),
}

impl From<ServiceError> for WebError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::NotFound => Self::NotFound,
            ServiceError::Unauthenticated => Self::Unauthenticated,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<RepoError> for WebError {
    fn from(value: RepoError) -> Self {
        Self::from(ServiceError::from(value))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, Html(render::not_found())).into_response(),
            Self::Unauthenticated => Redirect::to("/login/").into_response(),
            Self::Internal(message) => {
                error!("event=http_error module=web status=error error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::server_error()),
                )
                    .into_response()
            }
        }
    }
}
