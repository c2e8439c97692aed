//! Local implementations of the library, installer and media collaborators.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gamedir_model::{
    GameConfig, GameFilter, GameRecord, InstallError, Installer, InstallerScript, Library,
    LibraryError, MediaDownloader,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Game library stored as a JSON array of [`GameRecord`].
pub struct FileLibrary {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. An absent file is an empty library.
    fn load(&self) -> Result<Vec<GameRecord>, LibraryError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, games: &[GameRecord]) -> Result<(), LibraryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(games)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `game` under a fresh id and returns the stored record.
    pub fn add_game(&self, mut game: GameRecord) -> Result<GameRecord, LibraryError> {
        let _guard = self.lock_writes();
        let mut games = self.load()?;
        game.id = next_id(&games);
        games.push(game.clone());
        self.store(&games)?;
        debug!(game = %game.id, slug = %game.slug, "game added to library");
        Ok(game)
    }
}

/// One past the largest numeric id in use.
fn next_id(games: &[GameRecord]) -> String {
    let max = games
        .iter()
        .filter_map(|g| g.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

impl Library for FileLibrary {
    fn list_games(&self, filter: &GameFilter) -> Result<Vec<GameRecord>, LibraryError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|g| filter.matches(g))
            .collect())
    }

    fn get_game(&self, id: &str) -> Result<Option<GameRecord>, LibraryError> {
        Ok(self.load()?.into_iter().find(|g| g.id == id))
    }
}

/// Records games installed from a script into an existing folder.
///
/// Nothing is copied or downloaded: the folder already holds the game, so
/// installing means writing the library record.
pub struct LibraryInstaller {
    library: Arc<FileLibrary>,
}

impl LibraryInstaller {
    pub fn new(library: Arc<FileLibrary>) -> Self {
        Self { library }
    }
}

impl Installer for LibraryInstaller {
    fn install(&self, installer: &InstallerScript, target: &Path) -> Result<(), InstallError> {
        let required = installer.requires();
        if !required.is_empty() {
            let installed = self.library.list_games(&GameFilter::installed())?;
            if let Some(dependency) = required
                .into_iter()
                .find(|slug| !installed.iter().any(|g| &g.slug == slug))
            {
                return Err(InstallError::MissingDependency {
                    game: installer.game_slug.clone(),
                    dependency,
                });
            }
        }

        let mut section = installer.game_section().cloned().unwrap_or_default();
        if !section.contains_key("exe")
            && let Some(exe) = installer.top_level_exe()
        {
            section.insert("exe".into(), Value::String(exe.into()));
        }
        let section = expand_gamedir(section, target);

        let record = self.library.add_game(GameRecord {
            id: String::new(),
            slug: installer.game_slug.clone(),
            name: installer.game_slug.clone(),
            runner: installer.runner.clone(),
            directory: Some(target.to_path_buf()),
            installed: true,
            config: Some(GameConfig::from_game_section(section)),
        })?;

        info!(
            game = %record.id,
            slug = %record.slug,
            installer = %installer.slug,
            path = %target.display(),
            "game installed"
        );
        Ok(())
    }
}

/// Replaces the game directory placeholder in every string of `section`.
fn expand_gamedir(section: Map<String, Value>, target: &Path) -> Map<String, Value> {
    let target = target.to_string_lossy();
    section
        .into_iter()
        .map(|(key, value)| (key, expand_value(value, &target)))
        .collect()
}

fn expand_value(value: Value, target: &str) -> Value {
    match value {
        Value::String(s) => Value::String(s.replace("$GAMEDIR", target)),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| expand_value(v, target)).collect())
        }
        other => other,
    }
}

/// Media downloader that only logs requests.
pub struct LoggingMedia;

impl MediaDownloader for LoggingMedia {
    fn download_media(&self, slug: &str) {
        info!(slug, "media download requested");
    }
}
