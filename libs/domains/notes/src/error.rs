use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("{0}")]
    Validation(String),

    /// Carries the user-facing message of the failed lookup
    #[error("{0}")]
    NotFound(String),

    /// Caller is neither the owner nor an Admin
    #[error("Unauthorized")]
    Unauthorized,

    /// Store failure; the cause is logged, never returned
    #[error("Something went wrong.")]
    Internal(String),
}

pub type NoteResult<T> = Result<T, NoteError>;

impl NoteError {
    /// Replace a store failure with the operation's failure message.
    pub fn or_failed(self, message: &str) -> Self {
        match self {
            NoteError::Internal(cause) => {
                tracing::error!(error = %cause, "{}", message);
                NoteError::Validation(message.to_string())
            }
            other => other,
        }
    }
}

/// Convert NoteError to AppError: `Unauthorized` is 401, everything else 400.
impl From<NoteError> for AppError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::Unauthorized => AppError::Unauthorized(err.to_string()),
            NoteError::Internal(ref cause) => {
                tracing::error!(error = %cause, "Note operation failed");
                AppError::BadRequest(err.to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
