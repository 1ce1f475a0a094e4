//! # Axum Helpers
//!
//! Shared HTTP plumbing for the notes backend.
//!
//! ## Modules
//!
//! - **[`auth`]**: JWT issuing/verification, auth middleware, principal extractors
//!   and the row-level access policy
//! - **[`server`]**: Router assembly with API docs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: [`AppError`] and the JSON error envelope
//! - **[`extractors`]**: Validated JSON/form bodies and UUID path parameters
//! - **[`audit`]**: Security audit records
//!
//! ## Quick Start
//!
//! ```ignore
//! let api_routes = Router::new().merge(notes_router).merge(users_router);
//! let router = create_router::<ApiDoc>(api_routes).await?
//!     .merge(health_router(app_info!()));
//!
//! create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    ADMIN_ROLE, Access, AdminPrincipal, AuthError, IssuedToken, JwtAuth, JwtClaims, JwtConfig,
    Principal, can_access, jwt_auth_middleware,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedForm, ValidatedJson, empty_string_as_none};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
