use std::path::PathBuf;

/// File name of the path cache inside the application cache directory.
pub const CACHE_FILE_NAME: &str = "game-paths.json";

/// Application directory name under the platform cache root.
const APP_DIR: &str = "gamedir";

/// Returns the default location of the path cache file.
///
/// - Linux/BSD: `$XDG_CACHE_HOME/gamedir/game-paths.json`, falling back to
///   `~/.cache/gamedir/game-paths.json`
/// - Windows: `%LOCALAPPDATA%\gamedir\game-paths.json`
pub fn default_cache_path() -> PathBuf {
    cache_root().join(APP_DIR).join(CACHE_FILE_NAME)
}

#[cfg(not(target_os = "windows"))]
fn cache_root() -> PathBuf {
    match std::env::var("XDG_CACHE_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join(".cache"),
    }
}

#[cfg(target_os = "windows")]
fn cache_root() -> PathBuf {
    std::env::var("LOCALAPPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default\\AppData\\Local"))
}

/// Returns the user's home directory, `/tmp` if unknown.
pub(crate) fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
