// src/services/oauth.rs
//! Provider-neutral OAuth2 seam used by the auth service.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    /// 4xx from the provider: bad code, bad token, bad client.
    #[error("Rejected by provider: {0}")]
    Rejected(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("OAuth provider timed out")]
    Timeout,
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OAuthError::Timeout
        } else if err.is_decode() {
            OAuthError::SerializationError(err.to_string())
        } else {
            OAuthError::RequestFailed(err.to_string())
        }
    }
}

/// Identity returned by the provider's userinfo endpoint. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthIdentity {
    pub id: String,
    pub email: String,
    #[serde(default, alias = "email_verified")]
    pub verified_email: bool,
    #[serde(default)]
    pub name: Option<String>,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Provider name recorded in the user's SSO linkage.
    fn name(&self) -> &'static str;

    /// Consent page URL carrying the caller's CSRF `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Trade an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;

    async fn fetch_identity(&self, access_token: &str) -> Result<OAuthIdentity, OAuthError>;
}
