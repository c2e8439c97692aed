//! Errors raised by the collaborators.

/// Errors from the persistent game library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("library error: {0}")]
    Storage(String),
}

/// Errors from the game catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from installing a game into a folder.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The installer needs another game that is not installed.
    #[error("{game} requires {dependency} to be installed first")]
    MissingDependency { game: String, dependency: String },

    #[error("install failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Library(#[from] LibraryError),
}
