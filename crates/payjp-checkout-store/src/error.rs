//! Customer-record storage errors.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`Store`](crate::Store) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed (I/O, missing column family, poisoned lock).
    #[error("database error: {0}")]
    Database(String),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}
