//! Error types for the Lucerne library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`LucerneError`] enum.
//!
//! # Examples
//!
//! ```
//! use lucerne::error::{LucerneError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(LucerneError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Lucerne operations.
#[derive(Error, Debug)]
pub enum LucerneError {
    /// I/O errors (truncated streams, failed reads).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors (corrupt postings, bad segment data).
    #[error("Index error: {0}")]
    Index(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Query-related errors (invalid queries, bad sort specs).
    #[error("Query error: {0}")]
    Query(String),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid arguments, configuration, or missing documents.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with LucerneError.
pub type Result<T> = std::result::Result<T, LucerneError>;

impl LucerneError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        LucerneError::Index(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        LucerneError::Schema(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        LucerneError::Query(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        LucerneError::SerializationError(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        LucerneError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        LucerneError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        LucerneError::Other(format!("Not found: {}", msg.into()))
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        LucerneError::OperationCancelled(format!("Timeout: {}", msg.into()))
    }
}
