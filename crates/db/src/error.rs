use djumblelog_core::error::CoreError;

/// Failure of a journal operation: a domain error or a database error.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
