//! Database library for the notes backend: PostgreSQL connectivity, the audit
//! interceptor and the repository base shared by every domain.
//!
//! # Features
//!
//! - `config` (default) - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!   and [`common::RetryConfig`]
//!
//! # Examples
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "notes_api").await?;
//! ```
//!
//! ```ignore
//! use database::{BaseRepository, Change};
//!
//! let repo = BaseRepository::<note::Entity>::new(db);
//! repo.commit(vec![Change::Added(note)]).await?;
//! ```

pub mod audit;
pub mod common;
pub mod postgres;
pub mod repository;

pub use audit::{AuditFields, AuditInterceptor, Auditable, Change, Write};
pub use common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};
pub use repository::BaseRepository;
