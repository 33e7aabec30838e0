//! Server-rendered HTTP surface for habitrack.
//!
//! # Responsibility
//! - Map routes to core services through a request-scoped session context.
//! - Render HTML, set cookies, and translate service outcomes to responses.
//!
//! # Invariants
//! - No business rule lives here; ownership, validation and aggregation are
//!   decided by `habitrack_core`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
mod routes;
pub mod session;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{WebError, WebResult};
pub use routes::router;
pub use state::AppState;

use habitrack_core::db::{open_db, DbError};
use habitrack_core::{CredentialHasher, PasswordError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Startup or runtime failure of the server.
#[derive(Debug)]
pub enum ServeError {
    Db(DbError),
    Password(PasswordError),
    Io(std::io::Error),
}

impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Password(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io: {err}"),
        }
    }
}

impl Error for ServeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Password(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServeError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<PasswordError> for ServeError {
    fn from(value: PasswordError) -> Self {
        Self::Password(value)
    }
}

impl From<std::io::Error> for ServeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens (and migrates) the configured database and builds the hasher.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServeError> {
    let conn = open_db(&config.database)?;
    let hasher = CredentialHasher::new(config.hashing())?;
    Ok(AppState::new(conn, hasher, config.secure_cookies))
}

/// Serves until Ctrl-C, then drains in-flight requests.
pub async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    let state = build_state(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "event=server_start module=web status=ok bind={} database={}",
        listener.local_addr()?,
        config.database.display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=web status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_signal module=web status=error error={err}");
        std::future::pending::<()>().await;
    }
}
