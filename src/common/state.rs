// Application state shared across all modules

use std::time::Duration;

use crate::auth::AuthService;

/// Explicitly constructed in `main` and handed to handlers through an
/// `Extension<Arc<AppState>>`. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    /// Adds the `Secure` attribute to cookies (production mode).
    pub secure_cookies: bool,
    /// Lifetime of the `session_token` cookie; matches the JWT expiry.
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(auth: AuthService, secure_cookies: bool) -> Self {
        let session_ttl = auth.tokens().ttl();
        Self {
            auth,
            secure_cookies,
            session_ttl,
        }
    }
}
