//! Domain errors for the authentication core

use thiserror::Error;

use crate::services::OAuthError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("an account with this email already exists")]
    DuplicateKey,

    /// Store-level miss; use cases translate it before it reaches a client.
    #[error("record not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("no account found with this email; register first")]
    AccountNotFound,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid session")]
    Unauthenticated,

    /// Provider unreachable, failing or too slow; the same request may work later.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Provider refused the code or token; retrying the same request cannot help.
    #[error("OAuth rejected: {0}")]
    OAuthRejected(String),

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            ref e if e
                .as_database_error()
                .map_or(false, |db_err| db_err.is_unique_violation()) =>
            {
                AuthError::DuplicateKey
            }
            other => AuthError::Database(other.to_string()),
        }
    }
}

impl From<OAuthError> for AuthError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Rejected(_) => AuthError::OAuthRejected(err.to_string()),
            other => AuthError::OAuth(other.to_string()),
        }
    }
}
