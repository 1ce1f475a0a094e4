/// Error type for connection management and repository plumbing.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    /// A tracked update referenced a row that no longer exists.
    #[error("Record not found: {0}")]
    RecordNotFound(uuid::Uuid),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
