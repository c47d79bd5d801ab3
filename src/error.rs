use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Errors returned by [`crate::store::TaskStore`] operations.
///
/// `Validation`, `NotFound` and `Format` are raised before anything is
/// mutated. `Storage` is only produced by loading and exporting; save
/// failures after a mutation are recorded on the store instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("task '{0}' not found")]
    NotFound(String),

    #[error("invalid import format: {0}")]
    Format(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures of the persistence port.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to serialize tasks: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}
