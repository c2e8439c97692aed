//! Library-side game records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a game in the persistent library.
///
/// Always a string: the path cache stores ids as JSON object keys.
pub type GameId = String;

/// Per-game configuration.
///
/// Only the `game` section matters here; it carries the keys the path
/// derivation looks at (`exe`, `main_file`, `iso`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub game: Map<String, Value>,
}

impl GameConfig {
    /// Builds a config from a `game` section.
    pub fn from_game_section(game: Map<String, Value>) -> Self {
        Self { game }
    }

    /// Returns a string value of the `game` section, if present.
    pub fn game_str(&self, key: &str) -> Option<&str> {
        self.game.get(key).and_then(Value::as_str)
    }
}

/// A game as stored in the persistent library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    /// Name of the runner that launches the game (`wine`, `mame`, `steam`, ...).
    #[serde(default)]
    pub runner: String,
    /// Installation directory, if the game has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GameConfig>,
}

/// Filter accepted by [`Library::list_games`](crate::Library::list_games).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameFilter {
    /// `Some(true)` keeps installed games only, `Some(false)` the others.
    pub installed: Option<bool>,
}

impl GameFilter {
    /// Matches every game.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches installed games only.
    pub fn installed() -> Self {
        Self {
            installed: Some(true),
        }
    }

    /// Returns true if `game` passes this filter.
    pub fn matches(&self, game: &GameRecord) -> bool {
        self.installed.is_none_or(|installed| game.installed == installed)
    }
}
