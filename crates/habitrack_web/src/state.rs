//! Shared application state.

use crate::error::{WebError, WebResult};
use habitrack_core::CredentialHasher;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Cloned into every handler. The connection lock is taken for one
/// synchronous unit of work and never held across an `.await`; password
/// hashing runs on the blocking pool with no lock held.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    hasher: Arc<CredentialHasher>,
    secure_cookies: bool,
}

impl AppState {
    /// `conn` must come from `habitrack_core::db::open_db*` so migrations
    /// are applied.
    pub fn new(conn: Connection, hasher: CredentialHasher, secure_cookies: bool) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            hasher: Arc::new(hasher),
            secure_cookies,
        }
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Runs argon2 work on tokio's blocking pool so neither the connection
    /// lock nor an async worker is held while it computes.
    pub async fn with_hasher<T, F>(&self, work: F) -> WebResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CredentialHasher) -> T + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(&hasher))
            .await
            .map_err(|err| WebError::Internal(format!("hashing task failed: {err}")))
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Runs `work` with exclusive access to the connection.
    pub fn with_conn<T>(&self, work: impl FnOnce(&Connection) -> T) -> WebResult<T> {
        let conn = self
            .db
            .lock()
            .map_err(|_| WebError::Internal("database mutex poisoned".to_string()))?;
        Ok(work(&conn))
    }
}
