// REST API endpoints for the blog service

mod auth;
mod blog;
pub mod dto;
mod extract;
mod user;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{AccountService, PasswordHasher, TokenService};
use crate::config::ServiceConfig;
use crate::db::{Db, SessionPool};

pub use extract::Authenticated;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionPool,
    pub accounts: AccountService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire up the services from startup configuration.
    pub fn new(config: &ServiceConfig, db: Db) -> Result<Self> {
        let hasher = Arc::new(PasswordHasher::new(config.auth.bcrypt_cost)?);
        let tokens = Arc::new(TokenService::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl()?,
        ));

        info!(
            max_sessions = config.max_sessions,
            token_ttl_minutes = config.auth.token_ttl_minutes,
            bcrypt_cost = hasher.cost(),
            "application state ready"
        );

        Ok(Self {
            sessions: SessionPool::new(db, config.max_sessions),
            accounts: AccountService::new(hasher, tokens.clone()),
            tokens,
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/token", post(auth::token))
        .route("/user", post(user::create_user))
        .route("/user/me", get(user::me))
        .route("/user/{email}", get(user::get_user))
        .route("/blog", get(blog::list).post(blog::create))
        .route(
            "/blog/{id}",
            get(blog::show).put(blog::update).delete(blog::destroy),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
