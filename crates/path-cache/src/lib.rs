//! Persistent game id to entry-point path cache.
//!
//! The cache is a single pretty-printed JSON object stored under the
//! application cache directory:
//!
//! ```json
//! {
//!   "12": "/home/user/Games/hollow-knight/Hollow Knight",
//!   "31": "/home/user/Games/doom/doom.wad"
//! }
//! ```
//!
//! Reads are soft: an absent or corrupt file is an empty cache. Every
//! mutation rewrites the whole file and drops the in-process snapshot.

mod cache;
mod error;
mod location;
mod rules;

pub use cache::{PathCache, PathMap};
pub use error::PathCacheError;
pub use location::{CACHE_FILE_NAME, default_cache_path};
pub use rules::{PATH_KEYS, PathRules};
