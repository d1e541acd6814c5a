//! Signup and login.
//!
//! Both flows end either in a success payload or a uniform failure; a failed
//! login never reveals whether the email or the password was wrong.

use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::auth::extractor::AuthError;
use crate::auth::password::PasswordHasher;
use crate::auth::token::{TOKEN_TYPE, TokenService};
use crate::auth::user_store::{UserInsert, UserStore};
use crate::db::{UserCreate, UserRecord};
use crate::types::{Email, PasswordHash};

/// Details for a new account.
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: Email,
    pub password: String,
}

/// An issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Account operations shared by the HTTP handlers.
#[derive(Clone)]
pub struct AccountService {
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(hasher: Arc<PasswordHasher>, tokens: Arc<TokenService>) -> Self {
        Self { hasher, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new user.
    pub async fn signup(&self, users: &UserStore, signup: Signup) -> Result<UserRecord, AuthError> {
        if users.find_by_email(&signup.email).await?.is_some() {
            info!(email = %signup.email, "signup rejected: email already registered");
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hash_blocking(signup.password).await?;

        let create = UserCreate {
            email: signup.email,
            name: signup.name,
            password_hash,
        };

        match users.insert(&create).await? {
            UserInsert::Created(user) => {
                info!(user_id = %user.id, email = %user.email, "user registered");
                Ok(user)
            }
            UserInsert::EmailTaken => {
                info!(email = %create.email, "signup rejected: email already registered");
                Err(AuthError::Conflict)
            }
        }
    }

    /// Check credentials and issue an access token.
    pub async fn login(
        &self,
        users: &UserStore,
        email: &Email,
        password: String,
    ) -> Result<AccessToken, AuthError> {
        let user = users.find_by_email(email).await?;

        let verified = self.verify_blocking(password, user.as_ref()).await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!(email = %email, "login failed: invalid credentials");
                return Err(AuthError::Unauthenticated);
            }
        };

        let token = self.issue_for(&user)?;
        info!(user_id = %user.id, "access token issued");
        Ok(token)
    }

    /// Issue a token for an already-authenticated user.
    pub fn issue_for(&self, user: &UserRecord) -> Result<AccessToken, AuthError> {
        let mut extra = Map::new();
        extra.insert("user_id".to_string(), Value::from(user.id.get()));

        let access_token = self.tokens.issue(user.email.as_str(), extra)?;
        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    async fn hash_blocking(&self, password: String) -> Result<PasswordHash, AuthError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")??;
        Ok(hash)
    }

    async fn verify_blocking(&self, password: String, user: Option<&UserRecord>) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let stored = user.map(|u| u.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_decoy(&password),
        })
        .await
        .context("password verification task failed")?;
        Ok(verified)
    }
}
