// Core modules
pub mod auth;
pub mod blog;
mod config;
pub mod db;
mod error;
mod types;

// HTTP surface
pub mod api;

// Re-export key types and functions
pub use api::{AppState, create_router};
pub use auth::{AuthConfig, AuthError, Principal};
pub use config::{DEFAULT_BIND, ServiceConfig};
pub use db::{DatabaseConfig, SessionPool, create_connection, ensure_schema};
pub use error::{ApiError, ErrorBody};
pub use types::{BlogId, Email, PasswordHash, UserId};

use anyhow::Result;
use axum::Router;

/// Convenience function to build a ready-to-serve router.
///
/// Connects to the configured database, applies the schema, and wires the
/// services into an [`AppState`].
pub async fn create_app(config: &ServiceConfig) -> Result<Router> {
    let db = create_connection(config.database.clone()).await?;
    ensure_schema(&db).await?;

    let state = AppState::new(config, db)?;
    Ok(create_router(state))
}
