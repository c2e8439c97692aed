//! Path cache error types.

use gamedir_model::LibraryError;

/// Errors from mutating the path cache.
///
/// Reads never fail; see [`PathCache::read`](crate::PathCache::read).
#[derive(Debug, thiserror::Error)]
pub enum PathCacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("library error: {0}")]
    Library(#[from] LibraryError),
}
