use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use gamedir_model::{GameFilter, GameId, GameRecord, Library};
use tracing::{debug, warn};

use crate::error::PathCacheError;
use crate::location::default_cache_path;
use crate::rules::PathRules;

/// Contents of the cache file: game id → entry-point path.
pub type PathMap = BTreeMap<GameId, String>;

/// Persistent path cache with an in-process snapshot.
///
/// Mutations within one process are serialized; writers in other processes
/// are not coordinated and the last write wins.
pub struct PathCache {
    path: PathBuf,
    rules: PathRules,
    snapshot: RwLock<Option<Arc<PathMap>>>,
    write_lock: Mutex<()>,
}

impl PathCache {
    /// Creates a cache backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_rules(path, PathRules::default())
    }

    /// Creates a cache with custom runner rules.
    pub fn with_rules(path: impl Into<PathBuf>, rules: PathRules) -> Self {
        Self {
            path: path.into(),
            rules,
            snapshot: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a cache at the default location.
    pub fn open_default() -> Self {
        Self::new(default_cache_path())
    }

    /// Returns the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the runner rules used to derive paths.
    pub fn rules(&self) -> &PathRules {
        &self.rules
    }

    /// Reads the cache file, bypassing the snapshot.
    ///
    /// An absent, unreadable or corrupt file reads as an empty map.
    pub fn read(&self) -> PathMap {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no path cache file yet");
                return PathMap::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unable to read path cache");
                return PathMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "path cache is corrupt, ignoring it"
                );
                PathMap::new()
            }
        }
    }

    /// Returns the shared snapshot, loading it on first use.
    ///
    /// The snapshot is replaced, never mutated, when the file changes.
    pub fn cached(&self) -> Arc<PathMap> {
        if let Some(map) = self.snapshot.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Arc::clone(map);
        }

        let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slot.get_or_insert_with(|| Arc::new(self.read())))
    }

    /// Looks up the cached path of a game.
    pub fn get(&self, id: &str) -> Option<PathBuf> {
        self.cached().get(id).map(PathBuf::from)
    }

    /// Drops the snapshot so the next [`cached`](Self::cached) re-reads the file.
    pub fn invalidate(&self) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Rebuilds the cache from every installed, local game in `library`.
    ///
    /// Does nothing if the file exists and `force` is false. Returns whether
    /// the file was written.
    pub fn rebuild(&self, library: &dyn Library, force: bool) -> Result<bool, PathCacheError> {
        if self.path.exists() && !force {
            return Ok(false);
        }

        let start = Instant::now();
        let games = library.list_games(&GameFilter::installed())?;
        let paths = self.collect_paths(&games);

        let _guard = self.lock_writes();
        self.write(&paths)?;
        self.invalidate();

        debug!(
            entries = paths.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "game path cache built"
        );
        Ok(true)
    }

    /// Derives the path of game `id` and stores it.
    ///
    /// Unknown games and games without a derivable path are logged and
    /// left out.
    pub fn upsert(&self, library: &dyn Library, id: &str) -> Result<(), PathCacheError> {
        match library.get_game(id)? {
            Some(game) => self.upsert_game(&game),
            None => {
                warn!(game = %id, "game not in library, not caching its path");
                Ok(())
            }
        }
    }

    /// Derives the path of `game` and stores it.
    pub fn upsert_game(&self, game: &GameRecord) -> Result<(), PathCacheError> {
        debug!(game = %game.id, "adding game to path cache");
        let Some(path) = self.rules.entry_point(game) else {
            warn!(game = %game.id, "no path for game");
            return Ok(());
        };

        let _guard = self.lock_writes();
        let mut paths = self.read();
        paths.insert(game.id.clone(), path.to_string_lossy().into_owned());
        self.write(&paths)?;
        self.invalidate();
        Ok(())
    }

    /// Removes game `id` from the cache.
    pub fn remove(&self, id: &str) -> Result<(), PathCacheError> {
        debug!(game = %id, "removing game from path cache");
        let _guard = self.lock_writes();
        let mut paths = self.read();
        if paths.remove(id).is_none() {
            warn!(game = %id, "game not in path cache");
            return Ok(());
        }
        self.write(&paths)?;
        self.invalidate();
        Ok(())
    }

    fn collect_paths(&self, games: &[GameRecord]) -> PathMap {
        games
            .iter()
            .filter(|game| !self.rules.is_remote(&game.runner))
            .filter_map(|game| {
                let path = self.rules.entry_point(game)?;
                Some((game.id.clone(), path.to_string_lossy().into_owned()))
            })
            .collect()
    }

    /// Rewrites the whole file through a sibling temp file.
    fn write(&self, paths: &PathMap) -> Result<(), PathCacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(paths)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedir_model::{GameConfig, LibraryError};
    use serde_json::{Value, json};

    struct MockLibrary {
        games: Vec<GameRecord>,
    }

    impl Library for MockLibrary {
        fn list_games(&self, filter: &GameFilter) -> Result<Vec<GameRecord>, LibraryError> {
            Ok(self.games.iter().filter(|g| filter.matches(g)).cloned().collect())
        }

        fn get_game(&self, id: &str) -> Result<Option<GameRecord>, LibraryError> {
            Ok(self.games.iter().find(|g| g.id == id).cloned())
        }
    }

    fn game(id: &str, runner: &str, installed: bool, section: Value) -> GameRecord {
        GameRecord {
            id: id.into(),
            slug: format!("game-{id}"),
            name: format!("Game {id}"),
            runner: runner.into(),
            directory: Some(PathBuf::from(format!("/games/{id}"))),
            installed,
            config: Some(GameConfig::from_game_section(
                section.as_object().cloned().unwrap_or_default(),
            )),
        }
    }

    fn library() -> MockLibrary {
        MockLibrary {
            games: vec![
                game("1", "linux", true, json!({"exe": "run.sh"})),
                game("2", "wine", true, json!({"exe": "/opt/two/two.exe"})),
                game("3", "steam", true, json!({"exe": "steam.sh"})),
                game("4", "web", true, json!({"main_file": "index.html"})),
                game("5", "linux", false, json!({"exe": "uninstalled.sh"})),
                game("6", "linux", true, json!({})),
                game("7", "mame", true, json!({"main_file": "pacman"})),
            ],
        }
    }

    fn cache_in(dir: &tempfile::TempDir) -> PathCache {
        PathCache::new(dir.path().join("cache").join("game-paths.json"))
    }

    #[test]
    fn read_absent_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        assert!(cache.read().is_empty());
    }

    #[test]
    fn read_corrupt_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("game-paths.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cache = PathCache::new(&path);
        assert!(cache.read().is_empty());
        assert!(cache.cached().is_empty());
    }

    #[test]
    fn rebuild_keeps_installed_local_games_with_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);

        assert!(cache.rebuild(&library(), false).unwrap());

        let paths = cache.read();
        let keys: Vec<&str> = paths.keys().map(String::as_str).collect();
        assert_eq!(keys, ["1", "2"]);
        assert_eq!(paths["1"], "/games/1/run.sh");
        assert_eq!(paths["2"], "/opt/two/two.exe");
    }

    #[test]
    fn rebuild_without_force_is_noop_when_file_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        cache.rebuild(&library(), false).unwrap();

        let before = std::fs::read_to_string(cache.path()).unwrap();
        let mtime = std::fs::metadata(cache.path()).unwrap().modified().unwrap();

        let empty = MockLibrary { games: Vec::new() };
        assert!(!cache.rebuild(&empty, false).unwrap());

        assert_eq!(std::fs::read_to_string(cache.path()).unwrap(), before);
        assert_eq!(
            std::fs::metadata(cache.path()).unwrap().modified().unwrap(),
            mtime
        );
    }

    #[test]
    fn forced_rebuild_replaces_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        cache.rebuild(&library(), false).unwrap();
        assert_eq!(cache.cached().len(), 2);

        let smaller = MockLibrary {
            games: vec![game("9", "linux", true, json!({"exe": "nine"}))],
        };
        assert!(cache.rebuild(&smaller, true).unwrap());
        let snapshot = cache.cached();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("9"));
    }

    #[test]
    fn file_is_pretty_printed_json_object() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        cache.rebuild(&library(), false).unwrap();

        let content = std::fs::read_to_string(cache.path()).unwrap();
        assert!(content.starts_with("{\n  \"1\": "));
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert!(parsed.is_object());
    }

    #[test]
    fn upsert_then_read_contains_game() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        let lib = library();

        cache.upsert(&lib, "2").unwrap();
        assert_eq!(cache.read().get("2").map(String::as_str), Some("/opt/two/two.exe"));

        // Steam games are only skipped by rebuild, not by point updates.
        cache.upsert(&lib, "3").unwrap();
        assert_eq!(cache.read().len(), 2);
    }

    #[test]
    fn upsert_without_path_leaves_cache_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        let lib = library();

        cache.upsert(&lib, "6").unwrap();
        cache.upsert(&lib, "does-not-exist").unwrap();
        assert!(!cache.path().exists());
    }

    #[test]
    fn remove_then_read_lacks_game() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        cache.rebuild(&library(), false).unwrap();

        cache.remove("1").unwrap();
        let paths = cache.read();
        assert!(!paths.contains_key("1"));
        assert!(paths.contains_key("2"));
    }

    #[test]
    fn remove_absent_key_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        cache.remove("42").unwrap();
        assert!(cache.read().is_empty());
    }

    #[test]
    fn snapshot_is_replaced_after_mutation() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(&tmp);
        cache.rebuild(&library(), false).unwrap();

        let before = cache.cached();
        assert!(Arc::ptr_eq(&before, &cache.cached()));

        cache.remove("2").unwrap();
        let after = cache.cached();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.contains_key("2"));
        assert!(!after.contains_key("2"));
        assert_eq!(cache.get("1"), Some(PathBuf::from("/games/1/run.sh")));
    }
}
