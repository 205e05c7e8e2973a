// src/main.rs
use axum::{extract::Extension, http::Method, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod logging_middleware;
mod pages;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::{AuthService, PgUserStore, SqliteUserStore, TokenService, UserStore};
use common::config::{AppConfig, DatabaseConfig, DatabaseDriver};
use common::AppState;
use services::GoogleOAuthClient;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env()?;
    info!(
        port = config.server.port,
        mode = ?config.server.mode,
        timeout_secs = config.server.timeout.as_secs(),
        call_timeout_ms = config.server.call_timeout.as_millis() as u64,
        database = ?config.database.driver,
        "Configuration loaded"
    );
    info!(
        host = %config.cache.host,
        port = config.cache.port,
        db = config.cache.db,
        "Cache settings recognized but not used"
    );
    if !config.server.is_production() {
        warn!("Running in development mode - session cookies are sent without the Secure flag");
    }

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let store = connect_store(&config.database, config.server.call_timeout).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().timeout(config.server.call_timeout).build()?;

    let google = Arc::new(GoogleOAuthClient::new(http_client, &config.google));
    info!("GoogleOAuthClient initialized");

    let tokens = TokenService::new(&config.jwt.secret, config.jwt.expires_in_hrs);
    let auth_service = AuthService::new(store, google, tokens, config.server.call_timeout);
    info!("AuthService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = Arc::new(AppState::new(auth_service, config.server.is_production()));

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let app = build_router(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// ============================================================================
// DATABASE
// ============================================================================

async fn connect_store(
    database: &DatabaseConfig,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn UserStore>> {
    match database.driver {
        DatabaseDriver::Postgres => {
            let pool = PgPoolOptions::new()
                .acquire_timeout(timeout)
                .connect_with(database.pg_connect_options()?)
                .await?;
            common::migrations::run_migrations(&pool).await?;
            info!(host = %database.host, name = %database.name, "Connected to PostgreSQL");
            Ok(Arc::new(PgUserStore::new(pool)))
        }
        DatabaseDriver::Sqlite => {
            if let Some(path_part) = database.url.strip_prefix("sqlite://") {
                let path_without_params = path_part.split('?').next().unwrap_or("");
                if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
                    let db_path = PathBuf::from(path_without_params);
                    if let Some(parent) = db_path.parent() {
                        if !parent.as_os_str().is_empty() {
                            tokio::fs::create_dir_all(parent).await?;
                        }
                    }
                }
            }

            let connect_options =
                SqliteConnectOptions::from_str(&database.url)?.create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .acquire_timeout(timeout)
                .connect_with(connect_options)
                .await?;
            common::migrations::run_sqlite_migrations(&pool).await?;
            info!(url = %database.url, "Connected to SQLite");
            Ok(Arc::new(SqliteUserStore::new(pool)))
        }
    }
}

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

fn build_router(state: Arc<AppState>, config: &AppConfig) -> Router {
    let origins: Vec<axum::http::HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        // ====================================================================
        // PAGES (login page, health)
        // ====================================================================
        .merge(pages::pages_routes())
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
        .layer(TimeoutLayer::new(config.server.timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
}
