//! Matching of on-disk game folders against catalog entries.
//!
//! Everything here is synchronous and free of side effects apart from
//! filesystem existence checks:
//!
//! - [`normalize_folder_names`] — folder names → [`FolderSlugMap`]
//! - [`resolve_folder`] — catalog entry → folder on disk (slug, then aliases)
//! - [`derive_exe_from_installer`] — installer script → existing executable
//! - [`find_matching_installer`] — first installer whose executable exists

mod folders;
mod installer;
mod slug;

pub use folders::{FolderSlugMap, list_subfolders, normalize_folder_names, resolve_folder};
pub use installer::{derive_exe_from_installer, find_matching_installer, installer_exe};
pub use slug::slugify;
