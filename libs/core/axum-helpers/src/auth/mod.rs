//! Authentication and authorization.
//!
//! - HS256 token issuing and verification ([`JwtAuth`])
//! - [`jwt_auth_middleware`] for protected routes
//! - [`Principal`] / [`AdminPrincipal`] extractors built from the verified claims
//! - The row-level [`can_access`] policy
//!
//! ```ignore
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/note/index", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod policy;
pub mod principal;

pub use config::{DEFAULT_TOKEN_TTL_SECS, JwtConfig};
pub use jwt::{IssuedToken, JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
pub use policy::{ADMIN_ROLE, Access, can_access};
pub use principal::{AdminPrincipal, AuthError, Principal, current_user_id, current_user_role};
