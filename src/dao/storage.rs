use std::error::Error;
use thiserror::Error;

/// Result alias for quiz storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by quiz backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the query.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the backend was doing when it failed.
        message: String,
        /// Underlying driver or I/O error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered, but the eligible set changed under the offset lookup.
    #[error("no quiz at offset {offset} of the eligible set")]
    OffsetOutOfRange {
        /// Offset that no longer points into the eligible set.
        offset: u64,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
