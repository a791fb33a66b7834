//! Common error types for herdbook

use thiserror::Error;

/// Common result type for herdbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across herdbook crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Spreadsheet could not be opened or read
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Spreadsheet header row lacks required columns
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A data cell could not be converted to its field
    #[error("Row {row}, column '{column}': {message}")]
    InvalidRow {
        row: usize,
        column: String,
        message: String,
    },

    /// Lot builder operation not allowed or not satisfiable
    #[error(transparent)]
    Lot(#[from] crate::lot::LotError),
}
