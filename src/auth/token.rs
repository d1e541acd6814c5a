//! Issuing and verifying signed access tokens (HS256 JWTs).

use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Longest configurable token lifetime (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Token type reported alongside issued tokens.
pub const TOKEN_TYPE: &str = "bearer";

const RESERVED_CLAIMS: [&str; 3] = ["sub", "exp", "iat"];

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's identity key (email)
    pub sub: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Any extra claims, e.g. `user_id`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Look up an extra claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// Verification failure.
///
/// Expired, tampered and malformed tokens all produce the same value so that
/// callers cannot tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
}

/// Signs and verifies access tokens with a process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }

    /// Issue a token for `subject` with the default lifetime.
    pub fn issue(&self, subject: &str, extra: Map<String, Value>) -> Result<String> {
        self.issue_with_ttl(subject, extra, self.default_ttl)
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    ///
    /// `sub`, `exp` and `iat` are always set by the service; values for them
    /// in `extra` are dropped.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        mut extra: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String> {
        for reserved in RESERVED_CLAIMS {
            extra.remove(reserved);
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow!("token lifetime out of range"))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign access token")
    }

    /// Decode a token, checking its signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("token rejected: {}", e);
            TokenError::Invalid
        })?;

        let claims = data.claims;

        // A token is only valid strictly before its expiry instant.
        if claims.exp <= Utc::now().timestamp() {
            debug!("token rejected: expired");
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    fn extra(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let token = tokens
            .issue("alice@example.com", extra(json!({ "user_id": 7 })))
            .unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.get("user_id"), Some(&json!(7)));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_default_ttl_is_applied() {
        let tokens = service();
        let token = tokens.issue("alice@example.com", Map::new()).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_custom_ttl() {
        let tokens = service();
        let token = tokens
            .issue_with_ttl("alice@example.com", Map::new(), Duration::seconds(90))
            .unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 90);
    }

    #[test]
    fn test_reserved_claims_cannot_be_overridden() {
        let tokens = service();
        let token = tokens
            .issue(
                "alice@example.com",
                extra(json!({ "sub": "mallory@example.com", "exp": i64::MAX, "role": "admin" })),
            )
            .unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "alice@example.com");
        assert!(claims.exp < i64::MAX);
        assert_eq!(claims.get("role"), Some(&json!("admin")));
        assert!(claims.get("sub").is_none());
    }

    #[test]
    fn test_overflowing_ttl_is_an_error() {
        let tokens = TokenService::new(b"test-secret", Duration::MAX);
        assert!(tokens.issue("alice@example.com", Map::new()).is_err());

        let tokens = service();
        let result = tokens.issue_with_ttl("alice@example.com", Map::new(), Duration::MIN);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let tokens = service();
        let token = tokens
            .issue_with_ttl("alice@example.com", Map::new(), Duration::zero())
            .unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_and_tampered_are_indistinguishable() {
        let tokens = service();

        let expired = tokens
            .issue_with_ttl("alice@example.com", Map::new(), Duration::minutes(-5))
            .unwrap();

        let valid = tokens.issue("alice@example.com", Map::new()).unwrap();
        // Flip a character in the middle of the signature segment.
        let signature_start = valid.rfind('.').unwrap() + 1;
        let at = signature_start + 10;
        let original = valid.as_bytes()[at] as char;
        let replacement = if original == 'x' { "y" } else { "x" };
        let mut tampered = valid.clone();
        tampered.replace_range(at..at + 1, replacement);

        let expired_err = tokens.verify(&expired).unwrap_err();
        let tampered_err = tokens.verify(&tampered).unwrap_err();
        let malformed_err = tokens.verify("not.a.jwt").unwrap_err();

        assert_eq!(expired_err, tampered_err);
        assert_eq!(tampered_err, malformed_err);
        assert_eq!(expired_err.to_string(), tampered_err.to_string());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = service();
        let other = TokenService::new(b"another-secret", Duration::minutes(30));

        let token = issuer.issue("alice@example.com", Map::new()).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let tokens = service();
        let claims = Claims {
            sub: "alice@example.com".to_string(),
            exp: Utc::now().timestamp() + 600,
            iat: Utc::now().timestamp(),
            extra: Map::new(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert_eq!(service().verify(""), Err(TokenError::Invalid));
    }
}
