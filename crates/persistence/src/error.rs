/// Failure reported by a [`crate::PersistenceAdapter`].
///
/// Every variant is recoverable from the store's point of view: it falls back
/// to local state and logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("backend unavailable")]
    Unavailable,
    #[error("backend error: {0}")]
    Backend(String),
    #[error("remote data corrupt: {0}")]
    Corrupt(String),
    #[error("image processing failed: {0}")]
    Image(#[from] ImageError),
    #[error("storage error: {0}")]
    Io(String),
}

impl From<CacheError> for AdapterError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::StorageUnavailable => AdapterError::Unavailable,
            CacheError::Corrupt(msg) => AdapterError::Corrupt(msg),
            CacheError::Io(msg) => AdapterError::Io(msg),
        }
    }
}

/// Failure of the local tour cache.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("browser storage unavailable")]
    StorageUnavailable,
    #[error("cached tour data corrupt: {0}")]
    Corrupt(String),
    #[error("cache storage error: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("cannot decode image: {0}")]
    Decode(String),
    #[error("cannot encode image: {0}")]
    Encode(String),
}
