//! Storage errors

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Could not reach the database
    #[error("connection error: {0}")]
    Connection(String),

    /// A read query failed
    #[error("read error: {0}")]
    Read(String),

    /// A write query failed
    #[error("write error: {0}")]
    Write(String),

    /// A unique constraint was violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else (schema, row mapping)
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a unique-constraint conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
