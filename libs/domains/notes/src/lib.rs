//! Notes Domain
//!
//! Personal notes with row-level ownership: a note belongs to the user who
//! created it and is visible to that user and to admins only.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Handlers         │  ← HTTP endpoints under `/note`
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ NoteService      │  ← Ownership policy, validation
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ NoteRepository   │  ← In-memory / Postgres, audited writes
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ Models / Entity  │  ← Domain types, DTOs, sea-orm entity
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_notes::{handlers, InMemoryNoteRepository, NoteService};
//!
//! let service = NoteService::new(InMemoryNoteRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{NoteError, NoteResult};
pub use handlers::ApiDoc;
pub use models::{CreateNote, Note, NoteFilter, NoteView, UpdateNote};
pub use postgres::PgNoteRepository;
pub use repository::{InMemoryNoteRepository, NoteRepository};
pub use service::NoteService;
