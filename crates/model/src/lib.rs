//! Shared types for game-directory reconciliation.
//!
//! Holds the library-side [`GameRecord`], the catalog-side [`CatalogEntry`]
//! and [`InstallerScript`], and the traits through which the path cache,
//! the directory scanner and the missing-games tracker reach the outside
//! world (library storage, catalog service, installer, media downloads).

pub mod catalog;
pub mod collaborators;
pub mod error;
pub mod game;

pub use catalog::{Alias, CatalogEntry, GAMEDIR_PLACEHOLDER, InstallerScript};
pub use collaborators::{Catalog, CatalogFuture, Installer, Library, MediaDownloader};
pub use error::{CatalogError, InstallError, LibraryError};
pub use game::{GameConfig, GameFilter, GameId, GameRecord};
