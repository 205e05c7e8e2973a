//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
#[derive(FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub sso_provider: Option<String>,
    pub sso_email: Option<String>,
    pub sso_linked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Row to insert on registration
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<String>,
}

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    /// Subject: the user id as a string
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Registration and login input. Both fields default to empty so a missing
/// field reaches validation instead of failing extraction.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Query parameters Google appends to the redirect URL
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// A successful login: who logged in and the token they now hold
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}
