//! Authentication use cases
//!
//! [`AuthService`] composes the credential store, password hasher, OAuth
//! provider and token service. It holds no mutable state: every call is
//! evaluated against the current contents of the store.
//!
//! Each operation gets one deadline, `timeout` from its start, shared by all
//! of its store and provider calls. When it expires the downstream future is
//! dropped, which cancels the in-flight query or HTTP request, and the caller
//! gets `Database` or `OAuth` respectively.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::error::AuthError;
use super::models::{Credentials, LoginOutcome, NewUser, User};
use super::password;
use super::store::UserStore;
use super::tokens::TokenService;
use super::validators::RegistrationValidator;
use crate::common::{normalize_email, safe_email_log, Validator};
use crate::services::OAuthProvider;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    oauth: Arc<dyn OAuthProvider>,
    tokens: TokenService,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        oauth: Arc<dyn OAuthProvider>,
        tokens: TokenService,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            oauth,
            tokens,
            timeout,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    // ------------------------------------------------------------------------
    // Register
    // ------------------------------------------------------------------------

    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let deadline = self.deadline();
        let credentials = Credentials {
            email: normalize_email(email),
            password: password.to_string(),
        };

        let validation = RegistrationValidator.validate(&credentials);
        if !validation.is_valid {
            return Err(AuthError::Validation(validation.summary()));
        }

        let password_hash = hash_blocking(credentials.password).await?;
        let user = self
            .with_store_deadline(
                deadline,
                self.store.create(NewUser {
                    email: credentials.email,
                    password_hash: Some(password_hash),
                }),
            )
            .await?;

        info!(user_id = user.id, email = %safe_email_log(&user.email), "User registered");
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Password login
    // ------------------------------------------------------------------------

    /// Unknown email, SSO-only account and wrong password all fail the same
    /// way, and all of them pay for one hash verification.
    pub async fn password_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let deadline = self.deadline();
        let email = normalize_email(email);

        let user = match self
            .with_store_deadline(deadline, self.store.find_by_email(&email))
            .await
        {
            Ok(user) => user,
            Err(AuthError::NotFound) => {
                burn_verification(password).await;
                warn!(email = %safe_email_log(&email), "Login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let Some(stored_hash) = user.password_hash.clone() else {
            burn_verification(password).await;
            warn!(user_id = user.id, "Login failed: account has no password set");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(password.to_string(), stored_hash).await? {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, "Password login successful");
        Ok(LoginOutcome { user, token })
    }

    // ------------------------------------------------------------------------
    // OAuth login
    // ------------------------------------------------------------------------

    /// Authorization URL plus the random `state` the callback must echo back.
    pub fn authorization_url(&self) -> (String, String) {
        let state = generate_state();
        (self.oauth.authorization_url(&state), state)
    }

    /// Sign in an existing account through the provider. Accounts are never
    /// created here; an unknown email is `AccountNotFound` and nothing is written.
    pub async fn oauth_login(&self, code: &str) -> Result<LoginOutcome, AuthError> {
        let deadline = self.deadline();
        let access_token = self
            .with_oauth_deadline(deadline, "token exchange", self.oauth.exchange_code(code))
            .await?;
        let identity = self
            .with_oauth_deadline(
                deadline,
                "identity fetch",
                self.oauth.fetch_identity(&access_token),
            )
            .await?;

        if !identity.verified_email {
            warn!(
                provider_id = %identity.id,
                email = %safe_email_log(&identity.email),
                "OAuth login rejected: provider email not verified"
            );
            return Err(AuthError::UnverifiedEmail);
        }

        let email = normalize_email(&identity.email);
        let user = match self
            .with_store_deadline(deadline, self.store.find_by_email(&email))
            .await
        {
            Ok(user) => user,
            Err(AuthError::NotFound) => {
                info!(email = %safe_email_log(&email), "OAuth login for unregistered email");
                return Err(AuthError::AccountNotFound);
            }
            Err(e) => return Err(e),
        };

        let provider = self.oauth.name();
        self.with_store_deadline(
            deadline,
            self.store.update_sso_info(user.id, provider, &email),
        )
        .await?;
        let user = self
            .with_store_deadline(deadline, self.store.find_by_id(user.id))
            .await?;

        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, provider, "OAuth login successful");
        Ok(LoginOutcome { user, token })
    }

    // ------------------------------------------------------------------------
    // Session verification
    // ------------------------------------------------------------------------

    /// User id carried by a valid session token.
    pub async fn verify_session(&self, token: &str) -> Result<i64, AuthError> {
        self.tokens
            .verify(token)
            .map(|claims| claims.user_id)
            .map_err(|_| AuthError::Unauthenticated)
    }

    // ------------------------------------------------------------------------
    // Deadlines
    // ------------------------------------------------------------------------

    fn deadline(&self) -> Instant {
        Instant::now() + self.timeout
    }

    async fn with_store_deadline<T, F>(&self, deadline: Instant, fut: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        tokio::time::timeout_at(deadline, fut).await.map_err(|_| {
            warn!(timeout_ms = self.timeout.as_millis() as u64, "Database call timed out");
            AuthError::Database("database call timed out".to_string())
        })?
    }

    async fn with_oauth_deadline<T, F, E>(
        &self,
        deadline: Instant,
        step: &'static str,
        fut: F,
    ) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, E>>,
        AuthError: From<E>,
    {
        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => {
                warn!(step, timeout_ms = self.timeout.as_millis() as u64, "OAuth call timed out");
                Err(AuthError::OAuth(format!("{} timed out", step)))
            }
        }
    }
}

/// 32 random bytes, URL-safe base64 without padding.
fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
}

/// Verify against a fixed digest so a miss costs as much as a wrong password.
async fn burn_verification(password: &str) {
    let password = password.to_string();
    let _ = tokio::task::spawn_blocking(move || {
        password::verify_password(&password, password::dummy_hash())
    })
    .await;
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))?
}
