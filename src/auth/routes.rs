//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/register` - Form registration, redirects to `/`
/// - `POST /auth/login` - Password login (JSON or form), sets the session cookie
/// - `GET /auth/google/login` - Google consent URL
/// - `GET /auth/google/callback` - Google OAuth callback
/// - `GET /auth/verify` - Session check
/// - `POST /auth/logout` - Clears the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register_handler))
        .route("/auth/login", post(handlers::login_handler))
        .route("/auth/google/login", get(handlers::google_login_handler))
        .route("/auth/google/callback", get(handlers::google_callback_handler))
        .route("/auth/verify", get(handlers::verify_handler))
        .route("/auth/logout", post(handlers::logout_handler))
}
