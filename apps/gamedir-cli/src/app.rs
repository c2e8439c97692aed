//! Wires the library, path cache, catalog and tracker together for each
//! subcommand.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use gamedir_catalog::CatalogClient;
use gamedir_missing_games::{MissingGames, TrackerConfig};
use gamedir_model::{Catalog, GameFilter, GameId, Library};
use gamedir_path_cache::{PathCache, PathMap};
use gamedir_scanner::{DirectoryScanner, ScanResult};
use tokio::runtime::Handle;
use tracing::debug;

use crate::Command;
use crate::config::Config;
use crate::library::{FileLibrary, LibraryInstaller, LoggingMedia};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    config: Config,
    library: Arc<FileLibrary>,
    cache: Arc<PathCache>,
    catalog: Arc<dyn Catalog>,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = Arc::new(CatalogClient::new(&config.catalog_url)?);
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: Config, catalog: Arc<dyn Catalog>) -> Self {
        let library = Arc::new(FileLibrary::new(config.library_file()));
        let cache = Arc::new(PathCache::with_rules(config.cache_file(), config.path_rules()));
        debug!(
            library = %library.path().display(),
            cache = %cache.path().display(),
            "data files"
        );
        Self {
            config,
            library,
            cache,
            catalog,
        }
    }

    /// Scans `root` and adds the games it installed to the path cache.
    ///
    /// The root is canonicalized first: installed games record absolute
    /// directories, and folders already owned by a game are recognized by
    /// path equality.
    pub async fn scan(&self, root: &Path) -> anyhow::Result<ScanResult> {
        let root = std::fs::canonicalize(root)
            .with_context(|| format!("cannot resolve scan root {}", root.display()))?;
        let root = root.as_path();

        let known: HashSet<GameId> = self
            .library
            .list_games(&GameFilter::all())?
            .into_iter()
            .map(|g| g.id)
            .collect();

        let scanner = DirectoryScanner::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.library) as Arc<dyn Library>,
            Arc::new(LibraryInstaller::new(Arc::clone(&self.library))),
            Arc::new(LoggingMedia),
        );
        let result = scanner.scan(root).await?;

        for game in self.library.list_games(&GameFilter::installed())? {
            if !known.contains(&game.id) {
                self.cache.upsert_game(&game)?;
            }
        }

        Ok(result)
    }

    /// Rebuilds the path cache. Returns false if it existed and `force` is unset.
    pub fn rebuild(&self, force: bool) -> anyhow::Result<bool> {
        Ok(self.cache.rebuild(self.library.as_ref(), force)?)
    }

    /// Verifies every cached path and returns the missing game ids, sorted.
    pub async fn missing(&self) -> anyhow::Result<Vec<GameId>> {
        self.cache.rebuild(self.library.as_ref(), false)?;

        let tracker = MissingGames::with_config(
            Arc::clone(&self.cache),
            Handle::current(),
            TrackerConfig {
                stall: self.config.stall(),
            },
        );
        let mut updated = tracker.updated().subscribe();

        tracker.request_full_rescan();
        while tracker.is_checking() {
            tokio::select! {
                _ = updated.changed() => debug!("missing games updated"),
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }

        let mut ids: Vec<GameId> = tracker.missing_game_ids().into_iter().collect();
        ids.sort();
        Ok(ids)
    }

    pub fn cache_contents(&self) -> PathMap {
        self.cache.read()
    }
}

/// Runs one subcommand to completion.
pub async fn run(config: Config, command: Command) -> anyhow::Result<()> {
    let app = App::new(config)?;

    match command {
        Command::Scan { root } => {
            let result = app.scan(&root).await?;
            for (slug, folder) in &result.installed {
                println!("installed  {slug}  {folder}");
            }
            for (slug, folder) in &result.missing {
                println!("unmatched  {slug}  {folder}");
            }
            println!("{}", result.summary());
        }
        Command::Rebuild { force } => {
            if app.rebuild(force)? {
                println!("path cache written to {}", app.cache.path().display());
            } else {
                println!(
                    "path cache already exists at {} (use --force to rebuild)",
                    app.cache.path().display()
                );
            }
        }
        Command::Missing => {
            let ids = app.missing().await?;
            if ids.is_empty() {
                println!("no missing games");
            }
            for id in ids {
                println!("{id}");
            }
        }
        Command::Cache => {
            println!("{}", serde_json::to_string_pretty(&app.cache_contents())?);
        }
    }

    Ok(())
}
