//! Authentication configuration and identity resolution.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::context::Principal;
use crate::auth::password::DEFAULT_COST;
use crate::auth::token::{DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES, TokenService};
use crate::auth::user_store::UserStore;
use crate::types::Email;

/// Authentication configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens
    pub jwt_secret: String,
    /// Lifetime of issued access tokens, in minutes
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// bcrypt work factor
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_token_ttl_minutes() -> i64 {
    DEFAULT_TOKEN_TTL_MINUTES
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_COST
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthConfig {
    /// Create a config with the given secret and default ttl/cost.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    /// Create a config with a random secret, valid for this process only.
    pub fn ephemeral() -> Self {
        let secret = format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        );
        Self::with_secret(secret)
    }

    /// Token lifetime, checked against `1..=MAX_TOKEN_TTL_MINUTES`.
    pub fn token_ttl(&self) -> anyhow::Result<Duration> {
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.token_ttl_minutes) {
            anyhow::bail!(
                "token ttl must be between 1 and {} minutes, got {}",
                MAX_TOKEN_TTL_MINUTES,
                self.token_ttl_minutes
            );
        }
        Ok(Duration::minutes(self.token_ttl_minutes))
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity key is already registered
    #[error("Email already registered")]
    Conflict,
    /// Bad credentials, or a missing/invalid/expired token
    #[error("Could not validate credentials")]
    Unauthenticated,
    /// Hashing, signing or persistence failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Recovers the authenticated principal from a presented token.
///
/// Read-only: resolving never writes to the database, so it is safe to call
/// any number of times for the same token.
pub struct IdentityResolver<'a> {
    tokens: &'a TokenService,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(tokens: &'a TokenService) -> Self {
        Self { tokens }
    }

    pub async fn resolve(&self, users: &UserStore, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        if claims.sub.is_empty() {
            debug!("token rejected: empty subject");
            return Err(AuthError::Unauthenticated);
        }

        let email = Email::new(claims.sub);
        let user = users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                debug!("token subject has no matching user");
                AuthError::Unauthenticated
            })?;

        Ok(Principal::from(user))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_store::UserInsert;
    use crate::db::{DatabaseConfig, UserCreate, create_connection, ensure_schema};
    use crate::types::PasswordHash;
    use serde_json::{Map, json};

    async fn setup_store() -> UserStore {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        UserStore::new(db)
    }

    async fn insert_user(store: &UserStore, email: &str) {
        let outcome = store
            .insert(&UserCreate {
                email: Email::new(email),
                name: "Alice".to_string(),
                password_hash: PasswordHash::new("$2b$04$placeholder"),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, UserInsert::Created(_)));
    }

    fn tokens() -> TokenService {
        TokenService::new(b"resolver-secret", Duration::minutes(30))
    }

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::with_secret("s3cret");
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(config.bcrypt_cost, DEFAULT_COST);
        assert_eq!(config.token_ttl().unwrap(), Duration::minutes(30));
    }

    #[test]
    fn test_token_ttl_out_of_range_is_rejected() {
        for minutes in [0, -5, MAX_TOKEN_TTL_MINUTES + 1, i64::MAX] {
            let mut config = AuthConfig::with_secret("s3cret");
            config.token_ttl_minutes = minutes;
            assert!(config.token_ttl().is_err(), "ttl {minutes} accepted");
        }
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let config = AuthConfig::with_secret("s3cret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_ephemeral_secrets_differ() {
        let a = AuthConfig::ephemeral();
        let b = AuthConfig::ephemeral();
        assert_ne!(a.jwt_secret, b.jwt_secret);
        assert_eq!(a.jwt_secret.len(), 64);
    }

    #[test]
    fn test_auth_config_serde_defaults() {
        let config: AuthConfig = serde_json::from_value(json!({ "jwt_secret": "x" })).unwrap();
        assert_eq!(config.token_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert_eq!(config.bcrypt_cost, DEFAULT_COST);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("  Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("abc"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[tokio::test]
    async fn test_resolve_valid_token() {
        let store = setup_store().await;
        insert_user(&store, "alice@example.com").await;

        let tokens = tokens();
        let token = tokens.issue("alice@example.com", Map::new()).unwrap();

        let principal = IdentityResolver::new(&tokens)
            .resolve(&store, &token)
            .await
            .unwrap();
        assert_eq!(principal.email().as_str(), "alice@example.com");
        assert_eq!(principal.name(), "Alice");
    }

    #[tokio::test]
    async fn test_resolve_is_repeatable() {
        let store = setup_store().await;
        insert_user(&store, "alice@example.com").await;

        let tokens = tokens();
        let token = tokens.issue("alice@example.com", Map::new()).unwrap();
        let resolver = IdentityResolver::new(&tokens);

        let first = resolver.resolve(&store, &token).await.unwrap();
        let second = resolver.resolve(&store, &token).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_unknown_subject() {
        let store = setup_store().await;

        let tokens = tokens();
        let token = tokens.issue("ghost@example.com", Map::new()).unwrap();

        let result = IdentityResolver::new(&tokens).resolve(&store, &token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_resolve_empty_subject() {
        let store = setup_store().await;

        let tokens = tokens();
        let token = tokens.issue("", Map::new()).unwrap();

        let result = IdentityResolver::new(&tokens).resolve(&store, &token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_resolve_expired_and_garbage_tokens() {
        let store = setup_store().await;
        insert_user(&store, "alice@example.com").await;

        let tokens = tokens();
        let expired = tokens
            .issue_with_ttl("alice@example.com", Map::new(), Duration::zero())
            .unwrap();
        let resolver = IdentityResolver::new(&tokens);

        assert!(matches!(
            resolver.resolve(&store, &expired).await,
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            resolver.resolve(&store, "garbage").await,
            Err(AuthError::Unauthenticated)
        ));
    }
}
