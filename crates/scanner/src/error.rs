//! Scan error types.

use std::path::PathBuf;

use gamedir_model::{CatalogError, LibraryError};

/// Errors that abort a whole scan.
///
/// Failures limited to one catalog entry are logged and skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot list {}: {source}", path.display())]
    ListFolders {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}
