//! Credential store: persistence for user records
//!
//! Each operation is a single atomic statement. Email uniqueness among
//! non-deleted rows is guaranteed by the `idx_users_email_active` partial
//! index, so two concurrent registrations for the same address cannot both
//! succeed; the loser gets [`AuthError::DuplicateKey`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, SqlitePool};
use tracing::{debug, error};

use super::error::AuthError;
use super::models::{NewUser, User};
use crate::common::safe_email_log;

const USER_COLUMNS: &str = "id, email, password_hash, sso_provider, sso_email, sso_linked_at, created_at, updated_at, deleted_at";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. `DuplicateKey` if the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Non-deleted user with exactly this email, or `NotFound`.
    async fn find_by_email(&self, email: &str) -> Result<User, AuthError>;

    /// Non-deleted user with this id, or `NotFound`.
    async fn find_by_id(&self, user_id: i64) -> Result<User, AuthError>;

    /// Record SSO linkage and stamp `sso_linked_at`. `NotFound` if the id is unknown.
    async fn update_sso_info(
        &self,
        user_id: i64,
        provider: &str,
        sso_email: &str,
    ) -> Result<(), AuthError>;
}

fn log_store_error(op: &'static str, err: &AuthError) {
    match err {
        AuthError::NotFound | AuthError::DuplicateKey => {
            debug!(operation = op, error = %err, "User store miss")
        }
        _ => error!(operation = op, error = %err, "Database error in user store"),
    }
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (email, password_hash, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(user.password_hash.as_deref())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                log_store_error("create", &err);
                err
            })
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                log_store_error("find_by_email", &err);
                err
            })?
            .ok_or_else(|| {
                debug!(email = %safe_email_log(email), "No user with this email");
                AuthError::NotFound
            })
    }

    async fn find_by_id(&self, user_id: i64) -> Result<User, AuthError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                log_store_error("find_by_id", &err);
                err
            })?
            .ok_or(AuthError::NotFound)
    }

    async fn update_sso_info(
        &self,
        user_id: i64,
        provider: &str,
        sso_email: &str,
    ) -> Result<(), AuthError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE users SET sso_provider = $1, sso_email = $2, sso_linked_at = $3, updated_at = $3 WHERE id = $4 AND deleted_at IS NULL",
        )
        .bind(provider)
        .bind(sso_email)
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = AuthError::from(e);
            log_store_error("update_sso_info", &err);
            err
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }
}

// ============================================================================
// SQLite (local development and tests)
// ============================================================================

#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fresh in-memory database with the schema applied.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::common::migrations::run_sqlite_migrations(&pool)
            .await
            .unwrap();
        Self::new(pool)
    }

    #[cfg(test)]
    pub async fn count_users(&self) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .unwrap();
        count
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(user.password_hash.as_deref())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                log_store_error("create", &err);
                err
            })
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                log_store_error("find_by_email", &err);
                err
            })?
            .ok_or_else(|| {
                debug!(email = %safe_email_log(email), "No user with this email");
                AuthError::NotFound
            })
    }

    async fn find_by_id(&self, user_id: i64) -> Result<User, AuthError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                let err = AuthError::from(e);
                log_store_error("find_by_id", &err);
                err
            })?
            .ok_or(AuthError::NotFound)
    }

    async fn update_sso_info(
        &self,
        user_id: i64,
        provider: &str,
        sso_email: &str,
    ) -> Result<(), AuthError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE users SET sso_provider = ?, sso_email = ?, sso_linked_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(provider)
        .bind(sso_email)
        .bind(now)
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = AuthError::from(e);
            log_store_error("update_sso_info", &err);
            err
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }
}
