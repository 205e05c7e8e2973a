//! Authentication handlers

use axum::{
    extract::{rejection::FormRejection, Extension, Form, Json, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use super::cookies::{
    build_cookie, clear_cookie, constant_time_eq, read_cookie, OAUTH_STATE_COOKIE,
    OAUTH_STATE_TTL, SESSION_COOKIE,
};
use super::extractors::{LoginPayload, SessionUser};
use super::models::{Credentials, OAuthCallbackParams};
use crate::common::{safe_email_log, ApiError, AppState};
use crate::pages::render_login_page;

/// POST /auth/register
/// Registers an account from the login page form
///
/// Redirects to `/` with 303 on success. On failure the login page is
/// rendered again with the error message.
pub async fn register_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<Credentials>, FormRejection>,
) -> Response {
    let Form(credentials) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(error = %rejection, "Registration form could not be parsed");
            return (
                StatusCode::BAD_REQUEST,
                Html(render_login_page(Some("Email and password are required"))),
            )
                .into_response();
        }
    };

    match state
        .auth
        .register(&credentials.email, &credentials.password)
        .await
    {
        Ok(user) => {
            info!(user_id = user.id, "Registration complete, redirecting to login page");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            warn!(
                email = %safe_email_log(&credentials.email),
                error = %e,
                "Registration failed"
            );
            let api_error = ApiError::from(e);
            (
                api_error.status(),
                Html(render_login_page(Some(api_error.message()))),
            )
                .into_response()
        }
    }
}

/// POST /auth/login
/// Password login; accepts JSON or form bodies
///
/// # Response
/// ```json
/// {
///   "message": "Login successful",
///   "token": "<jwt token>"
/// }
/// ```
/// The token is also set as the HttpOnly `session_token` cookie.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    LoginPayload(credentials): LoginPayload,
) -> Result<impl IntoResponse, ApiError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let outcome = state
        .auth
        .password_login(&credentials.email, &credentials.password)
        .await?;

    let cookie = build_cookie(
        SESSION_COOKIE,
        &outcome.token,
        state.session_ttl,
        state.secure_cookies,
    );

    Ok((
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "message": "Login successful",
            "token": outcome.token,
        })),
    ))
}

/// GET /auth/google/login
/// Returns the Google consent URL and binds a fresh CSRF state to the browser
///
/// # Response
/// ```json
/// { "url": "https://accounts.google.com/o/oauth2/v2/auth?..." }
/// ```
pub async fn google_login_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let (url, oauth_state) = state.auth.authorization_url();
    let cookie = build_cookie(
        OAUTH_STATE_COOKIE,
        &oauth_state,
        OAUTH_STATE_TTL,
        state.secure_cookies,
    );

    info!("Starting Google OAuth flow");
    ([(SET_COOKIE, cookie)], Json(serde_json::json!({ "url": url })))
}

/// GET /auth/google/callback?code=...&state=...
/// Exchanges the authorization code and signs in the matching account
///
/// # Response
/// ```json
/// { "token": "<jwt token>" }
/// ```
/// The `oauth_state` cookie is single-use: it is cleared whatever the outcome.
pub async fn google_callback_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<OAuthCallbackParams>,
) -> Response {
    let clear_state = [(SET_COOKIE, clear_cookie(OAUTH_STATE_COOKIE, state.secure_cookies))];

    match complete_google_login(&state, &headers, &params).await {
        Ok(token) => (clear_state, Json(serde_json::json!({ "token": token }))).into_response(),
        Err(e) => (clear_state, e).into_response(),
    }
}

async fn complete_google_login(
    state: &AppState,
    headers: &HeaderMap,
    params: &OAuthCallbackParams,
) -> Result<String, ApiError> {
    if let Some(error) = params.error.as_deref() {
        warn!(oauth_error = %error, "Google OAuth returned error");
        return Err(ApiError::BadRequest(format!(
            "Google sign-in failed: {}",
            error
        )));
    }

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("code is required".to_string()))?;

    let expected_state = read_cookie(headers, OAUTH_STATE_COOKIE);
    let state_matches = match (params.state.as_deref(), expected_state.as_deref()) {
        (Some(received), Some(expected)) => constant_time_eq(received, expected),
        _ => false,
    };
    if !state_matches {
        warn!(
            has_state_param = params.state.is_some(),
            has_state_cookie = expected_state.is_some(),
            "OAuth callback rejected: state mismatch"
        );
        return Err(ApiError::BadRequest("invalid OAuth state".to_string()));
    }

    let outcome = state.auth.oauth_login(code).await?;
    Ok(outcome.token)
}

/// GET /auth/verify
/// Checks the `session_token` cookie
///
/// # Response
/// ```json
/// { "message": "Session is valid", "user_id": 1 }
/// ```
pub async fn verify_handler(session: SessionUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Session is valid",
        "user_id": session.user_id,
    }))
}

/// POST /auth/logout
/// Clears the session cookie
pub async fn logout_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    info!("User logout");
    (
        [(SET_COOKIE, clear_cookie(SESSION_COOKIE, state.secure_cookies))],
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}
