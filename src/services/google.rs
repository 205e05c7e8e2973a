// src/services/google.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::common::config::GoogleOAuthConfig;
use crate::common::safe_email_log;
use crate::services::oauth::{OAuthError, OAuthIdentity, OAuthProvider};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Google implementation of the authorization-code flow.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    /// `client` should carry the request timeout; it is shared by every call.
    pub fn new(client: Client, config: &GoogleOAuthConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }

    /// Point the token and userinfo calls somewhere other than Google.
    pub fn with_endpoints(mut self, token_url: &str, userinfo_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.userinfo_url = userinfo_url.to_string();
        self
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope_param = SCOPES.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(&scope_param),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send token exchange request");
                OAuthError::from(e)
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");
            let message = format!("HTTP {}: {}", status, error_text);
            return Err(if status.is_client_error() {
                OAuthError::Rejected(message)
            } else {
                OAuthError::OAuthFailed(message)
            });
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::SerializationError(e.to_string()))?;

        debug!(
            token_type = token_response.token_type.as_deref().unwrap_or("unknown"),
            "Successfully exchanged authorization code for tokens"
        );
        Ok(token_response.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<OAuthIdentity, OAuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send userinfo request");
                OAuthError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Userinfo request rejected");
            let message = format!("Failed to get user info: HTTP {}", status);
            return Err(if status.is_client_error() {
                OAuthError::Rejected(message)
            } else {
                OAuthError::RequestFailed(message)
            });
        }

        let identity = response
            .json::<OAuthIdentity>()
            .await
            .map_err(|e| OAuthError::SerializationError(e.to_string()))?;

        info!(
            provider_id = %identity.id,
            email = %safe_email_log(&identity.email),
            verified = identity.verified_email,
            "Fetched Google identity"
        );
        Ok(identity)
    }
}
