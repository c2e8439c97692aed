//! Directory scan orchestration.

use std::borrow::Cow;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamedir_matcher::{
    FolderSlugMap, find_matching_installer, list_subfolders, normalize_folder_names,
    resolve_folder, slugify,
};
use gamedir_model::{
    Catalog, CatalogEntry, GameFilter, InstallError, Installer, InstallerScript, Library,
    MediaDownloader,
};
use tracing::{debug, error, info, warn};

use crate::error::ScanError;

/// Outcome of a scan: every subfolder of the root lands in exactly one map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Folders recognized as installed games (already or by this scan).
    pub installed: FolderSlugMap,
    /// Folders no catalog entry could be installed into.
    pub missing: FolderSlugMap,
}

impl ScanResult {
    /// One-line summary for logs and CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} installed, {} unmatched",
            self.installed.len(),
            self.missing.len()
        )
    }
}

/// Scans directories for games installed earlier and reinstalls them into
/// the library.
pub struct DirectoryScanner {
    catalog: Arc<dyn Catalog>,
    library: Arc<dyn Library>,
    installer: Arc<dyn Installer>,
    media: Arc<dyn MediaDownloader>,
}

impl DirectoryScanner {
    /// Creates a scanner over the given collaborators.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        library: Arc<dyn Library>,
        installer: Arc<dyn Installer>,
        media: Arc<dyn MediaDownloader>,
    ) -> Self {
        Self {
            catalog,
            library,
            installer,
            media,
        }
    }

    /// Scans the immediate subfolders of `root`.
    ///
    /// Folders already claimed by an installed game are reported as
    /// installed without touching them again, so repeated scans never
    /// install a game twice.
    pub async fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        let folders = list_subfolders(root).map_err(|source| ScanError::ListFolders {
            path: root.to_path_buf(),
            source,
        })?;
        let slugs = normalize_folder_names(&folders);
        let used = self.used_directories()?;

        let keys: Vec<String> = slugs.keys().cloned().collect();
        let entries = if keys.is_empty() {
            Vec::new()
        } else {
            self.catalog.get_catalog_entries(&keys).await?
        };
        debug!(
            root = %root.display(),
            folders = slugs.len(),
            entries = entries.len(),
            "scanning directory"
        );

        let mut seen = HashSet::new();
        let mut installed_slugs = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.slug.as_str()) {
                continue;
            }
            if let Some(folder_slug) = self.reconcile(entry, &slugs, root, &used).await {
                installed_slugs.insert(folder_slug);
            }
        }

        let (installed, missing): (FolderSlugMap, FolderSlugMap) = slugs
            .into_iter()
            .partition(|(slug, _)| installed_slugs.contains(slug));
        let result = ScanResult { installed, missing };
        info!(root = %root.display(), "scan finished: {}", result.summary());
        Ok(result)
    }

    /// Directories already associated with installed games.
    fn used_directories(&self) -> Result<HashSet<PathBuf>, ScanError> {
        Ok(self
            .library
            .list_games(&GameFilter::installed())?
            .into_iter()
            .filter_map(|game| game.directory)
            .collect())
    }

    /// Matches one catalog entry against the folders and installs it if
    /// possible. Returns the slug of the folder it now accounts for.
    async fn reconcile(
        &self,
        entry: &CatalogEntry,
        slugs: &FolderSlugMap,
        root: &Path,
        used: &HashSet<PathBuf>,
    ) -> Option<String> {
        let Some(folder) = resolve_folder(entry, slugs, root) else {
            debug!(game = %entry.slug, "no folder matches catalog entry");
            return None;
        };
        let folder_slug = slugify(folder.file_name()?.to_str()?);

        if used.contains(&folder) {
            debug!(game = %entry.slug, folder = %folder.display(), "folder already installed");
            return Some(folder_slug);
        }

        let installers = self.installers_for(entry).await?;
        let Some((exe, installer)) = find_matching_installer(&folder, &installers) else {
            debug!(game = %entry.slug, folder = %folder.display(), "no installer matches folder");
            return None;
        };

        info!(game = %entry.name, path = %exe.display(), "found game");
        match self.installer.install(installer, &folder) {
            Ok(()) => {}
            Err(e @ InstallError::MissingDependency { .. }) => {
                error!(game = %entry.name, error = %e, "skipped game");
                return None;
            }
            Err(e) => {
                error!(game = %entry.name, error = %e, "failed to install game");
                return None;
            }
        }

        self.media.download_media(&entry.slug);
        Some(folder_slug)
    }

    async fn installers_for<'a>(
        &self,
        entry: &'a CatalogEntry,
    ) -> Option<Cow<'a, [InstallerScript]>> {
        if !entry.installers.is_empty() {
            return Some(Cow::Borrowed(entry.installers.as_slice()));
        }

        match self.catalog.get_installer_scripts(&entry.slug).await {
            Ok(installers) => Some(Cow::Owned(installers)),
            Err(e) => {
                warn!(game = %entry.slug, error = %e, "unable to fetch installers");
                None
            }
        }
    }
}
