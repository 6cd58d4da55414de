//! Error types for the booksync ecosystem.

use thiserror::Error;

/// Errors that can occur in booksync operations.
#[derive(Error, Debug)]
pub enum BookSyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for booksync operations.
pub type BookSyncResult<T> = Result<T, BookSyncError>;
