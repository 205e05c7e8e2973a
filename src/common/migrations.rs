// src/common/migrations.rs
//! Database schema management
//!
//! The schema is a single `users` table. Email uniqueness only applies to rows
//! that are not soft-deleted, so it is enforced with a partial unique index
//! rather than a column constraint. Every statement is idempotent and runs on
//! each startup.

use sqlx::{PgPool, SqlitePool};
use tracing::info;

const POSTGRES_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT,
        sso_provider TEXT,
        sso_email TEXT,
        sso_linked_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_active ON users (email) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users (deleted_at)",
];

const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL,
        password_hash TEXT,
        sso_provider TEXT,
        sso_email TEXT,
        sso_linked_at TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        deleted_at TEXT
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_active ON users (email) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users (deleted_at)",
];

/// Create the schema on a PostgreSQL pool
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in POSTGRES_SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("✅ Database migration completed successfully (postgres)");
    Ok(())
}

/// Create the schema on a SQLite pool
pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SQLITE_SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("✅ Database migration completed successfully (sqlite)");
    Ok(())
}
