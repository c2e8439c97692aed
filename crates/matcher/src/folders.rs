use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gamedir_model::CatalogEntry;
use tracing::{debug, warn};

use crate::slug::slugify;

/// Folder slug → original folder name, built fresh for each scan.
pub type FolderSlugMap = BTreeMap<String, String>;

/// Lists the immediate subdirectories of `root`, sorted by name.
///
/// Entries whose names are not valid UTF-8 are skipped.
pub fn list_subfolders(root: &Path) -> std::io::Result<Vec<String>> {
    let mut folders = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => folders.push(name),
            Err(name) => warn!(folder = ?name, "skipping folder with non UTF-8 name"),
        }
    }

    folders.sort();
    Ok(folders)
}

/// Maps each folder name to its slug.
///
/// When two folders share a slug, the later one in `folder_names` wins.
/// Names with an empty slug are ignored.
pub fn normalize_folder_names<I, S>(folder_names: I) -> FolderSlugMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = FolderSlugMap::new();
    for name in folder_names {
        let name = name.as_ref();
        let slug = slugify(name);
        if slug.is_empty() {
            debug!(folder = name, "folder name has no usable slug");
            continue;
        }
        if let Some(previous) = map.insert(slug.clone(), name.to_string()) {
            debug!(slug = %slug, previous = %previous, folder = name, "folder slug collision");
        }
    }
    map
}

/// Finds the folder under `root` belonging to `entry`.
///
/// The entry's own slug is tried first, then each alias in listed order.
/// The first slug whose folder exists on disk wins.
pub fn resolve_folder(entry: &CatalogEntry, slugs: &FolderSlugMap, root: &Path) -> Option<PathBuf> {
    entry.candidate_slugs().find_map(|slug| {
        let folder = root.join(slugs.get(slug)?);
        folder.exists().then_some(folder)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedir_model::Alias;
    use std::fs;

    fn entry(slug: &str, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            slug: slug.into(),
            name: slug.into(),
            aliases: aliases
                .iter()
                .map(|a| Alias {
                    slug: (*a).into(),
                    name: String::new(),
                })
                .collect(),
            installers: Vec::new(),
        }
    }

    #[test]
    fn normalize_maps_slug_to_folder() {
        let map = normalize_folder_names(["Hollow Knight", "unknown-game"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map["hollow-knight"], "Hollow Knight");
        assert_eq!(map["unknown-game"], "unknown-game");
    }

    #[test]
    fn normalize_collision_last_wins() {
        let map = normalize_folder_names(["Hollow Knight", "hollow-knight"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["hollow-knight"], "hollow-knight");
    }

    #[test]
    fn normalize_is_deterministic() {
        let names = ["Quake", "Doom II", "doom-ii", "Ys: Origin", "東方"];
        assert_eq!(normalize_folder_names(names), normalize_folder_names(names));
        assert!(!normalize_folder_names(names).values().any(|v| v == "東方"));
    }

    #[test]
    fn list_subfolders_skips_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("b-game")).unwrap();
        fs::create_dir(tmp.path().join("a-game")).unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let folders = list_subfolders(tmp.path()).unwrap();
        assert_eq!(folders, ["a-game", "b-game"]);
    }

    #[test]
    fn list_subfolders_missing_root_errors() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(list_subfolders(&tmp.path().join("nope")).is_err());
    }

    #[test]
    fn resolve_prefers_own_slug() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("Hollow Knight")).unwrap();
        fs::create_dir(tmp.path().join("hk")).unwrap();
        let slugs = normalize_folder_names(["Hollow Knight", "hk"]);

        let found = resolve_folder(&entry("hollow-knight", &["hk"]), &slugs, tmp.path());
        assert_eq!(found, Some(tmp.path().join("Hollow Knight")));
    }

    #[test]
    fn resolve_falls_back_to_alias_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("HK")).unwrap();
        fs::create_dir(tmp.path().join("Knight")).unwrap();
        let slugs = normalize_folder_names(["HK", "Knight"]);

        let found = resolve_folder(
            &entry("hollow-knight", &["knight", "hk"]),
            &slugs,
            tmp.path(),
        );
        assert_eq!(found, Some(tmp.path().join("Knight")));
    }

    #[test]
    fn resolve_skips_slugs_whose_folder_vanished() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("hk")).unwrap();
        // "hollow-knight" is listed but no longer on disk.
        let slugs = normalize_folder_names(["hollow-knight", "hk"]);

        let found = resolve_folder(&entry("hollow-knight", &["hk"]), &slugs, tmp.path());
        assert_eq!(found, Some(tmp.path().join("hk")));
    }

    #[test]
    fn resolve_returns_none_without_match() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("other")).unwrap();
        let slugs = normalize_folder_names(["other"]);

        assert_eq!(
            resolve_folder(&entry("hollow-knight", &["hk"]), &slugs, tmp.path()),
            None
        );
    }
}
