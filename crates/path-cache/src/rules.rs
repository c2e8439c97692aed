//! Derivation of a game's entry-point path from its configuration.

use std::path::PathBuf;

use gamedir_model::GameRecord;
use serde_json::Value;
use tracing::{debug, warn};

use crate::location::home_dir;

/// Configuration keys searched for an entry point, highest priority first.
///
/// `files` holds a list; its first element is used.
pub const PATH_KEYS: [&str; 7] = ["exe", "main_file", "iso", "rom", "disk-a", "path", "files"];

/// Runner classification used when deriving and collecting paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRules {
    /// Runners whose games have no local files (streaming, browser).
    /// Their games never enter the cache on rebuild.
    pub remote_runners: Vec<String>,
    /// Runners that may reference games by catalog id instead of a file
    /// (arcade ROM sets). A `main_file` without an extension is such an id.
    pub id_only_runners: Vec<String>,
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            remote_runners: vec!["steam".into(), "web".into()],
            id_only_runners: vec!["mame".into()],
        }
    }
}

impl PathRules {
    /// Returns true if games of `runner` are never cached.
    pub fn is_remote(&self, runner: &str) -> bool {
        self.remote_runners.iter().any(|r| r == runner)
    }

    /// Returns the path of the game's main entry point, if one is configured.
    ///
    /// The first key of [`PATH_KEYS`] holding a non-empty value wins. `~/`
    /// is expanded, and relative values are resolved against the game's
    /// install directory.
    pub fn entry_point(&self, game: &GameRecord) -> Option<PathBuf> {
        let Some(config) = game.config.as_ref() else {
            warn!(game = %game.id, "game has no configuration");
            return None;
        };

        if self.id_only_runners.iter().any(|r| *r == game.runner)
            && let Some(main_file) = config.game_str("main_file")
            && !main_file.contains('.')
        {
            debug!(game = %game.id, main_file, "skipping game referenced by id");
            return None;
        }

        for key in PATH_KEYS {
            let Some(value) = config.game.get(key) else {
                continue;
            };
            let raw = if key == "files" {
                value.as_array().and_then(|files| files.first())
            } else {
                Some(value)
            };
            let Some(raw) = raw.and_then(Value::as_str).filter(|s| !s.is_empty()) else {
                continue;
            };

            let path = expand_home(raw);
            if path.is_absolute() {
                return Some(path);
            }
            return Some(match &game.directory {
                Some(dir) => dir.join(path),
                None => path,
            });
        }

        warn!(game = %game.id, "no path found in game configuration");
        None
    }
}

/// Expands a `~` prefix to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}
