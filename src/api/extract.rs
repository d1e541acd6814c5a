//! Request extractors.
//!
//! Both extractors acquire a [`DbSession`] from the pool when the request
//! starts. The session lives as long as the handler holds the extractor and
//! is released on drop, whichever way the handler exits.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::api::AppState;
use crate::auth::{IdentityResolver, Principal, bearer_token};
use crate::db::DbSession;
use crate::error::{ApiError, CREDENTIALS_DETAIL};

impl FromRequestParts<AppState> for DbSession {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.acquire().await?)
    }
}

/// The caller's identity plus the session it was resolved through.
///
/// Handlers reuse `session` for their own reads and writes, so an
/// authenticated request holds exactly one session.
pub struct Authenticated {
    pub principal: Principal,
    pub session: DbSession,
}

impl std::ops::Deref for Authenticated {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.principal
    }
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(bearer_token)
            .map(String::from)
            .ok_or_else(|| {
                debug!("request carries no bearer token");
                ApiError::unauthenticated(CREDENTIALS_DETAIL)
            })?;

        let session = state.sessions.acquire().await?;
        let principal = IdentityResolver::new(&state.tokens)
            .resolve(&session.users(), &token)
            .await?;

        Ok(Authenticated { principal, session })
    }
}
