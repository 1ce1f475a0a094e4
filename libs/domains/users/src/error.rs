use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    /// Carries the user-facing message of the failed lookup
    #[error("{0}")]
    NotFound(String),

    #[error("Email address is taken.")]
    EmailTaken,

    #[error("Another user with the same email address already exists")]
    DuplicateEmail,

    #[error(
        "Could not create user. Please make sure the password contains at least 8 characters, an uppercase and lowercase letter, a number and a special character."
    )]
    WeakPassword,

    #[error(
        "Could not set new user password. Please make sure your old password is correct and that your new password contains at least 8 characters, an uppercase and lowercase letter, a number and a special character."
    )]
    PasswordChangeRejected,

    #[error("Could not set new user role.")]
    RoleAssignment,

    #[error("The user already has a role assigned.")]
    RoleAlreadyAssigned,

    /// Caller may not act on this user
    #[error("Unauthorized")]
    Unauthorized,

    /// Login rejected; the message names the reason
    #[error("{0}")]
    Unauthenticated(String),

    /// Store or hashing failure; the cause is logged, never returned
    #[error("Something went wrong.")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Replace an internal failure with an operation-specific message,
    /// keeping every other error as is.
    pub fn or_failed(self, message: &str) -> Self {
        match self {
            UserError::Internal(cause) => {
                tracing::error!(error = %cause, "{}", message);
                UserError::Validation(message.to_string())
            }
            other => other,
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Unauthorized | UserError::Unauthenticated(_) => {
                AppError::Unauthorized(err.to_string())
            }
            UserError::Internal(ref cause) => {
                tracing::error!(error = %cause, "User operation failed");
                AppError::BadRequest(err.to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
