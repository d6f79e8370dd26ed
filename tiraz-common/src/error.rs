//! Common error types for Tiraz

use thiserror::Error;

/// Common result type for Tiraz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Tiraz binaries
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data rejected the write (e.g. a reference to a missing row)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Turn SQLite foreign key violations into `InvalidInput`
    ///
    /// Any other database error is kept as `Database`.
    #[cfg(feature = "sqlx")]
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Error::InvalidInput(format!("{} references a row that does not exist", what))
            }
            _ => Error::Database(err),
        }
    }
}
