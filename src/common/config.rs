// src/common/config.rs
//! Runtime configuration loaded from environment variables (and `.env` via dotenv).
//!
//! Every option has an env var of the form `SECTION_KEY`, e.g. `SERVER_PORT`,
//! `DATABASE_USER`, `GOOGLE_CLIENT_ID`, `JWT_SECRET`. Missing credentials fail
//! validation so the server never starts half-configured.

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub mode: ServerMode,
    /// Whole-request limit enforced by the router.
    pub timeout: Duration,
    /// Budget for the downstream calls of one auth operation. Always shorter
    /// than `timeout` so a slow database or provider surfaces as a typed error
    /// instead of the router's bare 408.
    pub call_timeout: Duration,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.mode == ServerMode::Production
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseDriver {
    Postgres,
    Sqlite,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub driver: DatabaseDriver,
    /// Only used by the sqlite driver.
    pub url: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub timezone: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("sslmode", &self.sslmode)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection options for the postgres driver.
    pub fn pg_connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let ssl_mode = PgSslMode::from_str(&self.sslmode).map_err(|_| ConfigError::Invalid {
            key: "DATABASE_SSLMODE",
            value: self.sslmode.clone(),
        })?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(ssl_mode)
            .options([("timezone", self.timezone.as_str())]))
    }
}

#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

/// One year.
pub const MAX_JWT_EXPIRES_IN_HRS: i64 = 24 * 366;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hrs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expires_in_hrs", &self.expires_in_hrs)
            .finish()
    }
}

/// Cache connection settings. Recognized for compatibility with existing
/// deployments; nothing in the service talks to the cache yet.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u8,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub google: GoogleOAuthConfig,
    pub jwt: JwtConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        // Server
        let port = parse_or(&get, "SERVER_PORT", 8080u16)?;
        let mode = match or_default("SERVER_MODE", "development").to_lowercase().as_str() {
            "development" | "dev" => ServerMode::Development,
            "production" | "prod" => ServerMode::Production,
            other => {
                return Err(ConfigError::Invalid {
                    key: "SERVER_MODE",
                    value: other.to_string(),
                })
            }
        };
        let timeout_secs = parse_or(&get, "SERVER_TIMEOUT", 30u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SERVER_TIMEOUT",
                value: "0".to_string(),
            });
        }
        let call_timeout = match get("SERVER_CALL_TIMEOUT") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: "SERVER_CALL_TIMEOUT",
                    value: raw.clone(),
                })?;
                if secs == 0 || secs >= timeout_secs {
                    return Err(ConfigError::Invalid {
                        key: "SERVER_CALL_TIMEOUT",
                        value: raw,
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(timeout_secs) * 2 / 3,
        };
        let cors_origins = or_default("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // Database
        let driver = match or_default("DATABASE_DRIVER", "postgres").to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseDriver::Postgres,
            "sqlite" => DatabaseDriver::Sqlite,
            other => {
                return Err(ConfigError::Invalid {
                    key: "DATABASE_DRIVER",
                    value: other.to_string(),
                })
            }
        };
        let database = DatabaseConfig {
            driver,
            url: or_default("DATABASE_URL", "sqlite://sso_auth.db"),
            host: or_default("DATABASE_HOST", "localhost"),
            port: parse_or(&get, "DATABASE_PORT", 5432u16)?,
            user: get("DATABASE_USER").unwrap_or_default(),
            password: get("DATABASE_PASSWORD").unwrap_or_default(),
            name: get("DATABASE_NAME").unwrap_or_default(),
            sslmode: or_default("DATABASE_SSLMODE", "disable"),
            timezone: or_default("DATABASE_TIMEZONE", "UTC"),
        };

        // OAuth
        let google = GoogleOAuthConfig {
            client_id: get("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: get("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_url: get("GOOGLE_REDIRECT_URL").unwrap_or_default(),
        };

        // JWT
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").unwrap_or_default(),
            expires_in_hrs: parse_or(&get, "JWT_EXPIRES_IN_HRS", 24i64)?,
        };

        // Cache
        let cache = CacheConfig {
            host: or_default("REDIS_HOST", "localhost"),
            port: parse_or(&get, "REDIS_PORT", 6379u16)?,
            password: get("REDIS_PASSWORD"),
            db: parse_or(&get, "REDIS_DB", 0u8)?,
        };

        let config = AppConfig {
            server: ServerConfig {
                port,
                mode,
                timeout: Duration::from_secs(timeout_secs),
                call_timeout,
                cors_origins,
            },
            database,
            google,
            jwt,
            cache,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every credential the service cannot run without is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.driver == DatabaseDriver::Postgres {
            if self.database.user.is_empty() {
                return Err(ConfigError::Missing("DATABASE_USER"));
            }
            if self.database.password.is_empty() {
                return Err(ConfigError::Missing("DATABASE_PASSWORD"));
            }
            if self.database.name.is_empty() {
                return Err(ConfigError::Missing("DATABASE_NAME"));
            }
        }

        if self.google.client_id.is_empty() {
            return Err(ConfigError::Missing("GOOGLE_CLIENT_ID"));
        }
        if self.google.client_secret.is_empty() {
            return Err(ConfigError::Missing("GOOGLE_CLIENT_SECRET"));
        }
        if self.google.redirect_url.is_empty() {
            return Err(ConfigError::Missing("GOOGLE_REDIRECT_URL"));
        }

        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.jwt.expires_in_hrs <= 0 || self.jwt.expires_in_hrs > MAX_JWT_EXPIRES_IN_HRS {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRES_IN_HRS",
                value: self.jwt.expires_in_hrs.to_string(),
            });
        }

        Ok(())
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
