//! Shared application state handed to the route builders and `/ready`.

use axum_helpers::JwtAuth;

/// Cloned into every router that needs it; all members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Token issuer/verifier shared by `/authentication` and the JWT middleware
    pub jwt_auth: JwtAuth,
}
