//! Error types for the storage and store boundaries.
//!
//! Lookups that miss (increment/decrement with an unknown id) are not
//! errors anywhere in this crate - the UI may hold stale product
//! references and those must stay silent no-ops.

use thiserror::Error;

/// Errors from a [`KeyValueStorage`](crate::storage::KeyValueStorage)
/// backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors from the cart store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Serializing the cart snapshot failed.
    #[error("failed to serialize cart snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The most recent snapshot write failed; in-memory state is intact
    /// but storage is stale.
    #[error("cart snapshot write failed: {0}")]
    WriteFailed(String),

    /// A consumer used a [`CartHandle`](crate::handle::CartHandle) before
    /// a store was attached to it.
    #[error("cart handle is not attached to a store; attach one at startup before handing the handle to consumers")]
    Detached,

    /// [`CartHandle::attach`](crate::handle::CartHandle::attach) was
    /// called on a handle that already holds a store.
    #[error("cart handle already has a store attached")]
    AlreadyAttached,

    /// The persistence writer task stopped; durability can no longer be
    /// acknowledged.
    #[error("cart persistence writer stopped")]
    WriterGone,
}

/// Result type alias for [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::WriteFailed("disk full".to_owned());
        assert_eq!(err.to_string(), "cart snapshot write failed: disk full");

        let err = StoreError::from(StorageError::Backend("boom".to_owned()));
        assert_eq!(err.to_string(), "storage backend error: boom");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::from(io);
        assert!(matches!(err, StorageError::Io(_)));
    }
}
