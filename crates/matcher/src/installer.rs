use std::path::{Path, PathBuf};

use gamedir_model::{GAMEDIR_PLACEHOLDER, InstallerScript};

/// Returns the executable an installer script points at, as written in
/// the script.
///
/// With a `game` section, `game.exe` is used; without one, the top-level
/// `exe`. `game.main_file` is the fallback when neither yields a value.
pub fn installer_exe(installer: &InstallerScript) -> Option<&str> {
    let exe = if installer.game_section().is_some() {
        installer.exe()
    } else {
        installer.top_level_exe()
    };

    exe.filter(|s| !s.is_empty())
        .or_else(|| installer.main_file().filter(|s| !s.is_empty()))
}

/// Resolves the installer's executable inside `folder`.
///
/// Returns the full path only if the file exists.
pub fn derive_exe_from_installer(folder: &Path, installer: &InstallerScript) -> Option<PathBuf> {
    let exe = installer_exe(installer)?;
    let full_path = folder.join(exe.replace(GAMEDIR_PLACEHOLDER, ""));
    full_path.exists().then_some(full_path)
}

/// Returns the first installer, in the order given, whose executable
/// exists inside `folder`, along with that executable's path.
pub fn find_matching_installer<'a>(
    folder: &Path,
    installers: &'a [InstallerScript],
) -> Option<(PathBuf, &'a InstallerScript)> {
    installers.iter().find_map(|installer| {
        derive_exe_from_installer(folder, installer).map(|path| (path, installer))
    })
}
