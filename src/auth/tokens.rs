//! Session token issuance and verification (HS256 JWT)

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::error::AuthError;
use super::models::{Claims, User};

/// Signs and verifies session tokens with a single static secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str, expires_in_hrs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: expires_in_hrs.saturating_mul(3600),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.max(0) as u64)
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if it were `now`; expiry is `now + ttl`.
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            sub: user.id.to_string(),
            iat: iat.max(0) as usize,
            exp: iat.saturating_add(self.ttl_secs).max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, user_id = user.id, "JWT encoding error");
            AuthError::Internal("jwt error".to_string())
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "signature mismatch",
                _ => "malformed token",
            };
            warn!(error = %e, reason, "JWT validation failed");
            AuthError::InvalidToken(reason.to_string())
        })?;

        let claims = token_data.claims;
        if claims.sub != claims.user_id.to_string() {
            warn!(sub = %claims.sub, user_id = claims.user_id, "JWT subject does not match user id");
            return Err(AuthError::InvalidToken("subject mismatch".to_string()));
        }

        debug!(user_id = claims.user_id, "JWT validated");
        Ok(claims)
    }
}
