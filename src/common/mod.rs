// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod migrations;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::ApiError;
pub use helpers::{html_escape, normalize_email, safe_email_log, safe_token_log};
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
