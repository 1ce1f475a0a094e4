//! Users Domain
//!
//! Accounts, roles and credentials for the notes backend.
//!
//! # Features
//!
//! - Self-registration and JWT login (`/authentication`)
//! - Admin user management and self-service profile updates (`/user`)
//! - Password hashing with Argon2 and a password strength policy
//! - One role per user, enforced by the identity store
//! - Soft delete and audit stamping through `database::AuditInterceptor`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Handlers         │  ← HTTP endpoints (handlers, auth_handlers)
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ UserService      │  ← Access policy, credentials, validation
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ IdentityStore    │  ← Users, roles, membership (in-memory / Postgres)
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ Models / Entity  │  ← Domain types, DTOs, sea-orm entities
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryIdentityStore, UserService};
//!
//! let service = UserService::new(InMemoryIdentityStore::new());
//! let router = handlers::router(service);
//! ```

pub mod auth_handlers;
pub mod credentials;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use auth_handlers::{AuthApiDoc, AuthState};
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    AuthenticatedUser, CreateUser, LoginRequest, LoginResponse, RegisterUser, Role, UpdateProfile,
    UpdateUser, User, UserResponse,
};
pub use postgres::PgIdentityStore;
pub use repository::{IdentityStore, InMemoryIdentityStore};
pub use service::UserService;
