//! Traits for the systems this workspace talks to but does not own.
//!
//! The binary provides concrete implementations; tests use mocks. Keeping
//! these as traits leaves the matching, caching and tracking logic free of
//! storage, HTTP and installer details.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::catalog::{CatalogEntry, InstallerScript};
use crate::error::{CatalogError, InstallError, LibraryError};
use crate::game::{GameFilter, GameRecord};

/// Boxed future returned by [`Catalog`] methods.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Persistent game library (the database of known games).
pub trait Library: Send + Sync {
    /// Lists games matching `filter`.
    fn list_games(&self, filter: &GameFilter) -> Result<Vec<GameRecord>, LibraryError>;

    /// Looks up a single game by id.
    fn get_game(&self, id: &str) -> Result<Option<GameRecord>, LibraryError>;
}

/// Remote game catalog.
pub trait Catalog: Send + Sync {
    /// Fetches, in one batch, the entries whose slug is in `slugs`.
    fn get_catalog_entries<'a>(
        &'a self,
        slugs: &'a [String],
    ) -> CatalogFuture<'a, Vec<CatalogEntry>>;

    /// Fetches the installer scripts published for `slug`.
    fn get_installer_scripts<'a>(
        &'a self,
        slug: &'a str,
    ) -> CatalogFuture<'a, Vec<InstallerScript>>;
}

/// Installs a game from a script into an existing folder.
///
/// Persisting the resulting library record is the implementor's job.
pub trait Installer: Send + Sync {
    fn install(&self, installer: &InstallerScript, target: &Path) -> Result<(), InstallError>;
}

/// Best-effort download of catalog media (covers, banners, icons).
pub trait MediaDownloader: Send + Sync {
    /// Requests media for a catalog slug. Must not block on the download.
    fn download_media(&self, slug: &str);
}
