//! Directory scan: recognize previously installed games and reinstall them.
//!
//! Given a root directory, the scanner:
//!
//! 1. lists its subfolders and slugifies their names
//! 2. collects the directories already claimed by installed games
//! 3. asks the catalog, in one batch, about every folder slug
//! 4. for each catalog entry, resolves its folder and, unless it is already
//!    claimed, looks for an installer whose executable exists there and
//!    installs it
//! 5. splits the folders into installed and still missing
//!
//! The catalog, library, installer and media downloader are supplied by the
//! caller through the traits in `gamedir-model`.

pub mod error;
pub mod scanner;

pub use error::ScanError;
pub use scanner::{DirectoryScanner, ScanResult};
