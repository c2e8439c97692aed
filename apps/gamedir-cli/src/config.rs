//! Configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `$XDG_CONFIG_HOME/gamedir/config.toml` (`~/.config/gamedir/config.toml`)
//! - Windows: `%APPDATA%/gamedir/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use gamedir_path_cache::{PathRules, default_cache_path};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the game catalog API.
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    /// JSON file holding the game library.
    #[serde(default = "default_library_path")]
    pub library_path: String,

    /// Game path cache file (empty = default cache location).
    #[serde(default)]
    pub cache_path: String,

    /// Seconds to wait before checking a batch of games.
    #[serde(default = "default_stall_secs")]
    pub stall_secs: u64,

    /// Runners whose games have no local files.
    #[serde(default = "default_remote_runners")]
    pub remote_runners: Vec<String>,

    /// Runners that may name a game by id instead of a file.
    #[serde(default = "default_id_only_runners")]
    pub id_only_runners: Vec<String>,
}

fn default_catalog_url() -> String {
    gamedir_catalog::DEFAULT_BASE_URL.into()
}

fn default_library_path() -> String {
    "~/.local/share/gamedir/library.json".into()
}

fn default_stall_secs() -> u64 {
    3
}

fn default_remote_runners() -> Vec<String> {
    PathRules::default().remote_runners
}

fn default_id_only_runners() -> Vec<String> {
    PathRules::default().id_only_runners
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            library_path: default_library_path(),
            cache_path: String::new(),
            stall_secs: default_stall_secs(),
            remote_runners: default_remote_runners(),
            id_only_runners: default_id_only_runners(),
        }
    }
}

impl Config {
    /// Loads configuration from the per-user location, creating it with
    /// defaults if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads configuration from `path`, creating it with defaults if not found.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn library_file(&self) -> PathBuf {
        expand_home(&self.library_path)
    }

    pub fn cache_file(&self) -> PathBuf {
        if self.cache_path.is_empty() {
            default_cache_path()
        } else {
            expand_home(&self.cache_path)
        }
    }

    pub fn stall(&self) -> Duration {
        Duration::from_secs(self.stall_secs)
    }

    pub fn path_rules(&self) -> PathRules {
        PathRules {
            remote_runners: self.remote_runners.clone(),
            id_only_runners: self.id_only_runners.clone(),
        }
    }
}

/// Expands a leading `~` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => {
            let rest = rest.trim_start_matches(['/', '\\']);
            home_dir().join(rest)
        }
        None => PathBuf::from(path),
    }
}

fn home_dir() -> PathBuf {
    #[cfg(windows)]
    let var = "USERPROFILE";
    #[cfg(not(windows))]
    let var = "HOME";

    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    let root = std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join("AppData").join("Roaming"));

    #[cfg(not(target_os = "windows"))]
    let root = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));

    root.join("gamedir").join("config.toml")
}
