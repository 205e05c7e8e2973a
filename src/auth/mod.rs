//! # Auth Module
//!
//! Everything about who a request belongs to:
//! - Registration and password login
//! - Google OAuth login for pre-registered accounts
//! - JWT session tokens carried in the `session_token` cookie
//! - The credential store behind all of it

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod store;
pub mod tokens;
pub mod validators;


pub use error::AuthError;
pub use routes::auth_routes;
pub use service::AuthService;
pub use store::{PgUserStore, SqliteUserStore, UserStore};
pub use tokens::TokenService;
