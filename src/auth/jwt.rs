//! JWT Token Handler
//! Mission: Issue and verify short-lived bearer tokens

use crate::auth::models::{Claims, Identity};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

/// A signed token and when it stops being accepted
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and token lifetime
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Sign a token for `identity`, valid for the configured lifetime
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .context("Invalid timestamp")?;

        let claims = Claims {
            role: identity.role,
            user_id: identity.user_id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")?;

        debug!(
            user_id = %identity.user_id,
            role = identity.role.as_str(),
            expires_at = %expires_at,
            "issued token"
        );

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return its claims unchanged
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;
        Ok(decoded.claims)
    }
}

/// Why a token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed token or malformed payload
    Invalid,
    /// Past its embedded expiry
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Invalid => write!(f, "invalid token"),
            TokenError::Expired => write!(f, "expired token"),
        }
    }
}

impl std::error::Error for TokenError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn handler() -> JwtHandler {
        JwtHandler::new("test-secret-key-12345", Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    #[test]
    fn test_issue_and_verify() {
        let handler = handler();
        let identity = Identity::user("user-42");

        let issued = handler.issue(&identity).unwrap();
        assert!(!issued.token.is_empty());

        let claims = handler.verify(&issued.token).unwrap();
        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        assert_eq!(
            handler().verify("invalid.token.here"),
            Err(TokenError::Invalid)
        );
        assert_eq!(handler().verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn test_different_secret_is_invalid() {
        let other = JwtHandler::new("another-secret", Duration::hours(1));
        let issued = other.issue(&Identity::user("user-42")).unwrap();

        assert_eq!(handler().verify(&issued.token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token() {
        let stale = JwtHandler::new("test-secret-key-12345", Duration::hours(-2));
        let issued = stale.issue(&Identity::user("user-42")).unwrap();

        assert_eq!(handler().verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_payload_without_user_id_is_invalid() {
        #[derive(serde::Serialize)]
        struct Partial {
            role: &'static str,
            exp: i64,
        }
        let token = encode(
            &Header::default(),
            &Partial {
                role: "user",
                exp: Utc::now().timestamp() + 600,
            },
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert_eq!(handler().verify(&token), Err(TokenError::Invalid));
    }
}
