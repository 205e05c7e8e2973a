// src/services/mod.rs
//
// Outbound integrations used by the auth service

pub mod google;
pub mod oauth;

// Re-export commonly used types for convenience
pub use google::GoogleOAuthClient;
pub use oauth::{OAuthError, OAuthIdentity, OAuthProvider};
