//! Custom extractors for Axum handlers.
//!
//! Every rejection is rendered through [`AppError`](crate::errors::AppError).

pub mod uuid_path;
pub mod validated_form;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_form::{ValidatedForm, empty_string_as_none};
pub use validated_json::ValidatedJson;
