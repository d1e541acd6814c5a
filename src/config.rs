//! Service configuration.
//!
//! Assembled once at startup from CLI flags and environment variables, then
//! shared read-only for the life of the process.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;
use crate::db::{DEFAULT_MAX_SESSIONS, DatabaseConfig};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on
    pub bind: SocketAddr,
    /// Upper bound on concurrently open database sessions
    pub max_sessions: usize,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl ServiceConfig {
    pub fn new(bind: SocketAddr, database: DatabaseConfig, auth: AuthConfig) -> Self {
        Self {
            bind,
            max_sessions: DEFAULT_MAX_SESSIONS,
            database,
            auth,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// In-memory database, random secret, loopback bind.
    pub fn local() -> anyhow::Result<Self> {
        Ok(Self::new(
            DEFAULT_BIND.parse()?,
            DatabaseConfig {
                url: "memory".to_string(),
                ..Default::default()
            },
            AuthConfig::ephemeral(),
        ))
    }
}
