//! Catalog-side types: entries fetched from the game catalog and their
//! installer scripts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder installer scripts use for the game's install directory.
pub const GAMEDIR_PLACEHOLDER: &str = "$GAMEDIR/";

/// An alternate slug under which a catalog entry is also known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// One game title as described by the catalog. Identity is the slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<Alias>,
    /// Installers embedded in the catalog response; usually empty, in which
    /// case they are fetched per slug.
    #[serde(default)]
    pub installers: Vec<InstallerScript>,
}

impl CatalogEntry {
    /// Slugs to try when matching folders: own slug first, then aliases in
    /// listed order.
    pub fn candidate_slugs(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.slug.as_str()).chain(self.aliases.iter().map(|a| a.slug.as_str()))
    }
}

/// An installer script as published by the catalog.
///
/// The `script` document is opaque; only the handful of keys needed to
/// locate a game's executable are read from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallerScript {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub game_slug: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub runner: String,
    #[serde(default)]
    pub script: Value,
}

impl InstallerScript {
    /// The script's `game` section, if it has one.
    pub fn game_section(&self) -> Option<&Map<String, Value>> {
        self.script.get("game").and_then(Value::as_object)
    }

    /// `game.exe`, when the script has a `game` section.
    pub fn exe(&self) -> Option<&str> {
        self.game_section()
            .and_then(|game| game.get("exe"))
            .and_then(Value::as_str)
    }

    /// Top-level `exe` of the script.
    pub fn top_level_exe(&self) -> Option<&str> {
        self.script.get("exe").and_then(Value::as_str)
    }

    /// `game.main_file`, when the script has a `game` section.
    pub fn main_file(&self) -> Option<&str> {
        self.game_section()
            .and_then(|game| game.get("main_file"))
            .and_then(Value::as_str)
    }

    /// Slugs of games that must already be installed for this script to run.
    ///
    /// Accepts both a list and a comma-separated string.
    pub fn requires(&self) -> Vec<String> {
        match self.script.get("requires") {
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        }
    }
}
