//! JWT utilities for reading the session tokens issued by the backend.
//!
//! Tokens are verified against the shared HS256 secret before any claim is
//! trusted. Expiry is checked against an explicit `now` so callers (and tests)
//! control the clock.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded session token payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
}

/// Why a token was not accepted as a session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("no session token present")]
    Missing,
    #[error("session token is malformed or its signature is invalid: {0}")]
    Malformed(String),
    #[error("session token expired at {0}")]
    Expired(i64),
}

/// Verifies and decodes session tokens.
#[derive(Clone)]
pub struct JwtUtils {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtUtils {
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Expiry is compared against the caller's clock in `verify`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        JwtUtils {
            decoding_key,
            validation,
        }
    }

    /// Verify the signature and return the claims, ignoring expiry.
    pub fn decode_claims(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| SessionError::Malformed(e.to_string()))
    }

    /// Verify the signature and require `exp` to be after `now`.
    pub fn verify(&self, token: &str, now: i64) -> Result<SessionClaims, SessionError> {
        let claims = self.decode_claims(token)?;
        if claims.is_expired_at(now) {
            return Err(SessionError::Expired(claims.exp));
        }
        Ok(claims)
    }
}

impl SessionClaims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    /// Seconds left before expiry, zero once expired.
    pub fn seconds_remaining(&self, now: i64) -> i64 {
        (self.exp - now).max(0)
    }
}

#[cfg(test)]
pub mod test_tokens {
    use super::SessionClaims;
    use jsonwebtoken::{EncodingKey, Header, encode};

    pub const SECRET: &str = "test-secret";

    /// Sign claims the way the backend does.
    pub fn sign(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub fn claims(is_admin: bool, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: "user-1".to_string(),
            name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            is_admin,
            iat: exp - 3600,
            exp,
        }
    }

    pub fn token(is_admin: bool, exp: i64) -> String {
        sign(&claims(is_admin, exp), SECRET)
    }
}
