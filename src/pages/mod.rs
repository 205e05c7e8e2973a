//! # Pages Module
//!
//! Server-rendered HTML and public probes:
//! - `GET /` - login / registration page
//! - `GET /health` - liveness probe

pub mod templates;

use axum::{extract::Query, response::Html, routing::get, Json, Router};
use serde::Deserialize;

pub use templates::render_login_page;

#[derive(Deserialize, Debug, Default)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

/// GET /
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let error = query.error.as_deref().filter(|e| !e.trim().is_empty());
    Html(render_login_page(error))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn pages_routes() -> Router {
    Router::new()
        .route("/", get(login_page))
        .route("/health", get(health))
}
