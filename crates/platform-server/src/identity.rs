//! Session token verification
//!
//! This module provides JWT session tokens using the jsonwebtoken
//! crate with HS256. Tokens carry identity only: the caller's role is
//! always re-read from the stored account on every request, so a stale
//! or tampered token can never grant a role the datastore does not
//! hold.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identity verification error types.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token failed signature or claim validation
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// The token could not be produced
    #[error("failed to issue session token: {0}")]
    IssueFailed(String),
}

/// Claims carried in a session token.
///
/// There is deliberately no role claim here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// The authenticated user's ID
    pub sub: Uuid,

    /// Issued-at timestamp (seconds since epoch)
    pub iat: i64,

    /// Expiry timestamp (seconds since epoch)
    pub exp: i64,

    /// Unique token ID
    pub jti: Uuid,
}

/// Issues and verifies session tokens.
pub struct IdentityVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("token_duration", &self.token_duration)
            .finish()
    }
}

impl IdentityVerifier {
    /// Create a verifier from a shared HMAC secret.
    ///
    /// # Arguments
    ///
    /// * `secret` - The HS256 signing secret
    /// * `token_duration` - How long issued tokens stay valid
    pub fn new(secret: &str, token_duration: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration,
        }
    }

    /// Create a verifier with the default one-hour token lifetime.
    pub fn with_secret(secret: &str) -> Self {
        Self::new(secret, Duration::hours(1))
    }

    /// Issue a session token for a user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The authenticated user
    ///
    /// # Returns
    ///
    /// The encoded JWT
    pub fn issue(&self, user_id: Uuid) -> Result<String, IdentityError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.token_duration).timestamp(),
            jti: Uuid::now_v7(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::IssueFailed(e.to_string()))
    }

    /// Verify a session token and extract its claims.
    ///
    /// # Arguments
    ///
    /// * `token` - The encoded JWT
    ///
    /// # Returns
    ///
    /// The validated claims, identity only
    pub fn verify(&self, token: &str) -> Result<SessionClaims, IdentityError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let verifier = IdentityVerifier::with_secret("test-secret");
        let user_id = Uuid::now_v7();

        let token = verifier.issue(user_id).unwrap();
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = IdentityVerifier::with_secret("secret-a");
        let verifier = IdentityVerifier::with_secret("secret-b");

        let token = issuer.issue(Uuid::now_v7()).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let verifier = IdentityVerifier::with_secret("test-secret");
        assert!(verifier.verify("not.a.token").is_err());
        assert!(verifier.verify("").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let verifier = IdentityVerifier::new("test-secret", Duration::seconds(-120));
        let token = verifier.issue(Uuid::now_v7()).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_claims_carry_no_role() {
        let verifier = IdentityVerifier::with_secret("test-secret");
        let token = verifier.issue(Uuid::now_v7()).unwrap();
        let claims = verifier.verify(&token).unwrap();

        let value = serde_json::to_value(&claims).unwrap();
        assert!(value.get("role").is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let verifier = IdentityVerifier::with_secret("test-secret");
        let output = format!("{verifier:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("test-secret"));
    }
}
