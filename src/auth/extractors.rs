//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, Form, FromRequest, FromRequestParts, Json, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::cookies::{read_cookie, SESSION_COOKIE};
use super::models::Credentials;
use crate::common::{safe_token_log, ApiError, AppState};

/// Authenticated session extractor
///
/// Reads the `session_token` cookie and verifies it. Rejects with 401 when the
/// cookie is missing or the token does not verify.
#[derive(Debug)]
pub struct SessionUser {
    pub user_id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match read_cookie(&parts.headers, SESSION_COOKIE) {
            Some(t) => t,
            None => {
                debug!("Session check failed: no session cookie");
                return Err(ApiError::Unauthorized("No session found".into()));
            }
        };

        match app_state.auth.verify_session(&token).await {
            Ok(user_id) => Ok(SessionUser { user_id }),
            Err(e) => {
                warn!(
                    error = %e,
                    token = %safe_token_log(&token),
                    "Session check failed: token rejected"
                );
                Err(ApiError::Unauthorized("Invalid session".into()))
            }
        }
    }
}

/// Login body accepted as JSON or as an urlencoded form
#[derive(Debug)]
pub struct LoginPayload(pub Credentials);

#[async_trait]
impl<S> FromRequest<S> for LoginPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.starts_with("application/json"));

        let credentials = if is_json {
            let Json(credentials) = Json::<Credentials>::from_request(req, state)
                .await
                .map_err(|r| ApiError::BadRequest(format!("Binding error: {}", r.body_text())))?;
            credentials
        } else {
            let Form(credentials) = Form::<Credentials>::from_request(req, state)
                .await
                .map_err(|r| ApiError::BadRequest(format!("Binding error: {}", r.body_text())))?;
            credentials
        };

        Ok(LoginPayload(credentials))
    }
}
