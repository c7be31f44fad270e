//! Error types for the MySQL migration driver
//!
//! Usage errors are raised before any statement reaches the server. Errors
//! reported by the server or the client library are carried through as-is.

/// Result type alias for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Error types for driver operations
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Malformed call arguments, detected without touching the database
    #[error("{0}")]
    InvalidArguments(String),

    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Failure reported by the MySQL client, unmodified
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Configuration error in '{field}': {message}")]
    Configuration { field: String, message: String },
}

impl DriverError {
    /// Build the error returned for malformed call arguments
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        DriverError::InvalidArguments(message.into())
    }

    /// Whether the error came from the server or the client library
    pub fn is_database_error(&self) -> bool {
        matches!(self, DriverError::Database(_))
    }

    /// The raw client error, when there is one
    pub fn as_database_error(&self) -> Option<&sqlx::Error> {
        match self {
            DriverError::Database(err) => Some(err),
            _ => None,
        }
    }
}
