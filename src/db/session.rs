//! Request-scoped database sessions.
//!
//! A [`DbSession`] is acquired at the start of a unit of work and released
//! when it is dropped, on every exit path. The [`SessionPool`] bounds how
//! many sessions can be open at once.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

use crate::auth::UserStore;
use crate::blog::BlogStore;
use crate::db::Db;

/// Default upper bound on concurrently open sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// Process-wide source of [`DbSession`]s.
#[derive(Clone)]
pub struct SessionPool {
    db: Db,
    permits: Arc<Semaphore>,
    max_sessions: usize,
}

impl SessionPool {
    pub fn new(db: Db, max_sessions: usize) -> Self {
        let max_sessions = max_sessions.max(1);
        Self {
            db,
            permits: Arc::new(Semaphore::new(max_sessions)),
            max_sessions,
        }
    }

    /// Acquire a session, waiting while the pool is exhausted.
    pub async fn acquire(&self) -> Result<DbSession> {
        let permit = self.permits.clone().acquire_owned().await?;
        trace!(available = self.permits.available_permits(), "database session acquired");
        Ok(DbSession {
            db: self.db.clone(),
            _permit: permit,
        })
    }

    /// Number of sessions that can be acquired without waiting.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

/// A short-lived handle to the database, scoped to one unit of work.
pub struct DbSession {
    db: Db,
    _permit: OwnedSemaphorePermit,
}

impl DbSession {
    pub fn users(&self) -> UserStore {
        UserStore::new(self.db.clone())
    }

    pub fn blogs(&self) -> BlogStore {
        BlogStore::new(self.db.clone())
    }
}

impl Drop for DbSession {
    fn drop(&mut self) {
        trace!("database session released");
    }
}
