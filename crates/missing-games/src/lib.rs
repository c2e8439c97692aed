//! Background tracker of games whose cached entry point vanished from disk.
//!
//! [`MissingGames`] owns the set of missing game ids. Callers queue ids with
//! [`MissingGames::request_check`] or ask for a full pass with
//! [`MissingGames::request_full_rescan`]; a single background task verifies
//! the cached paths and fires [`MissingGames::updated`] when the set changes.
//! Observers re-read the set on notification.

mod error;
mod notification;
mod tracker;

pub use error::TrackerError;
pub use notification::{NotificationSource, RegistrationId};
pub use tracker::{DEFAULT_STALL, MissingGames, TrackerConfig};
