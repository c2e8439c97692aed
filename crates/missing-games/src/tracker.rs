use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use gamedir_model::GameId;
use gamedir_path_cache::PathCache;
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use crate::error::TrackerError;
use crate::notification::NotificationSource;

/// Pause before a batch of queued ids is verified.
pub const DEFAULT_STALL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Wait applied before the first batch of explicit ids and whenever new
    /// ids arrive after the work queue drained.
    pub stall: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stall: DEFAULT_STALL,
        }
    }
}

/// Tracks which games have lost their cached entry point.
///
/// At most one verification pass runs at a time. Requests made while a pass
/// is active are merged into it. Cloning yields another handle to the same
/// tracker.
#[derive(Clone)]
pub struct MissingGames {
    inner: Arc<Inner>,
}

struct Inner {
    cache: Arc<PathCache>,
    runtime: Handle,
    config: TrackerConfig,
    state: Mutex<QueueState>,
    missing: RwLock<HashSet<GameId>>,
    updated: NotificationSource,
}

#[derive(Default)]
struct QueueState {
    /// `Some` while a pass is active. Holds ids not yet moved to `queue`.
    pending: Option<HashSet<GameId>>,
    queue: Vec<GameId>,
    rescan_all: bool,
    /// The missing set changed since observers were last notified.
    changed: bool,
    /// Incremented for every pass started.
    pass: u64,
}

impl MissingGames {
    /// Creates a tracker with the default stall; passes run on `runtime`.
    pub fn new(cache: Arc<PathCache>, runtime: Handle) -> Self {
        Self::with_config(cache, runtime, TrackerConfig::default())
    }

    pub fn with_config(cache: Arc<PathCache>, runtime: Handle, config: TrackerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                runtime,
                config,
                state: Mutex::new(QueueState::default()),
                missing: RwLock::new(HashSet::new()),
                updated: NotificationSource::new(),
            }),
        }
    }

    /// Queues games for verification and starts a pass if none is active.
    ///
    /// A new pass given ids waits one stall first; with no ids it starts
    /// immediately.
    pub fn request_check<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<GameId>,
    {
        let ids: Vec<GameId> = ids.into_iter().map(Into::into).collect();
        let initial_delay = if ids.is_empty() {
            Duration::ZERO
        } else {
            self.inner.config.stall
        };

        let mut state = self.inner.lock_state();
        let start = state.pending.is_none();
        state.pending.get_or_insert_with(HashSet::new).extend(ids);
        if !start {
            return;
        }
        state.pass += 1;
        let pass = state.pass;
        drop(state);

        debug!(pass, ?initial_delay, "starting missing games pass");
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn(async move {
            inner.run_pass(pass, initial_delay).await;
        });
    }

    /// Re-verifies every game in the path cache.
    pub fn request_full_rescan(&self) {
        self.inner.lock_state().rescan_all = true;
        self.request_check(std::iter::empty::<GameId>());
    }

    /// Snapshot of the missing game ids.
    pub fn missing_game_ids(&self) -> HashSet<GameId> {
        self.inner.read_missing().clone()
    }

    pub fn is_missing(&self, id: &str) -> bool {
        self.inner.read_missing().contains(id)
    }

    /// True while a verification pass is active.
    pub fn is_checking(&self) -> bool {
        self.inner.lock_state().pending.is_some()
    }

    /// Fired whenever the missing set changed. Carries no payload.
    pub fn updated(&self) -> &NotificationSource {
        &self.inner.updated
    }
}

/// Resets the tracker to idle if its pass ends without doing so, and
/// flushes any unannounced change. Runs on success, error and panic alike.
struct PassGuard<'a> {
    inner: &'a Inner,
    pass: u64,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.inner.finish_pass(self.pass);
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_missing(&self) -> std::sync::RwLockReadGuard<'_, HashSet<GameId>> {
        self.missing.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_pass(self: Arc<Self>, pass: u64, initial_delay: Duration) {
        let _guard = PassGuard {
            inner: &self,
            pass,
        };

        if !initial_delay.is_zero() {
            tokio::time::sleep(initial_delay).await;
        }
        debug!(pass, "checking for missing games");

        if let Err(e) = self.drain().await {
            error!(pass, error = %e, "unable to detect missing games");
        }
    }

    async fn drain(&self) -> Result<(), TrackerError> {
        self.load_cache().await?;

        let mut checked = 0usize;
        while let Some(id) = self.next_game_id().await {
            self.check_game(&id).await?;
            checked += 1;
            tokio::task::yield_now().await;
        }
        debug!(checked, "missing games pass complete");
        Ok(())
    }

    /// Reads the cache file into its snapshot on the blocking pool so the
    /// lookups that follow stay in memory.
    async fn load_cache(&self) -> Result<(), TrackerError> {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || drop(cache.cached())).await?;
        Ok(())
    }

    /// Returns the next id to verify, or `None` once both queues are empty.
    ///
    /// Returning `None` marks the tracker idle in the same critical section
    /// that observed the empty queues, so a concurrent request either lands
    /// in this pass or starts the next one.
    async fn next_game_id(&self) -> Option<GameId> {
        loop {
            let rescan_all = std::mem::take(&mut self.lock_state().rescan_all);
            if rescan_all {
                let ids: Vec<GameId> = self.cache.cached().keys().cloned().collect();
                let mut state = self.lock_state();
                state.queue = ids;
                if let Some(pending) = state.pending.as_mut() {
                    pending.clear();
                }
            }

            let arrivals = {
                let state = self.lock_state();
                state.queue.is_empty() && state.pending.as_ref().is_some_and(|p| !p.is_empty())
            };
            if arrivals {
                self.notify_changed();
                tokio::time::sleep(self.config.stall).await;

                let mut state = self.lock_state();
                let QueueState { pending, queue, .. } = &mut *state;
                if let Some(pending) = pending.as_mut() {
                    queue.extend(pending.drain());
                }
            }

            let mut state = self.lock_state();
            if state.rescan_all {
                continue;
            }
            if let Some(id) = state.queue.pop() {
                return Some(id);
            }
            if state.pending.as_ref().is_some_and(|p| !p.is_empty()) {
                continue;
            }
            state.pending = None;
            return None;
        }
    }

    async fn check_game(&self, id: &str) -> Result<(), TrackerError> {
        let present = match self.cache.get(id) {
            Some(path) => tokio::fs::try_exists(&path).await.map_err(|source| {
                TrackerError::PathCheck {
                    game: id.to_string(),
                    source,
                }
            })?,
            None => false,
        };

        let changed = {
            let mut missing = self.missing.write().unwrap_or_else(PoisonError::into_inner);
            if present {
                missing.remove(id)
            } else {
                missing.insert(id.to_string())
            }
        };

        if changed {
            if present {
                info!(game = id, "game found again");
            } else {
                info!(game = id, "game is missing");
            }
            self.lock_state().changed = true;
        }
        Ok(())
    }

    fn notify_changed(&self) {
        let changed = std::mem::take(&mut self.lock_state().changed);
        if changed {
            self.updated.fire();
        }
    }

    fn finish_pass(&self, pass: u64) {
        {
            let mut state = self.lock_state();
            // A pass that ended normally already went idle, and a newer
            // pass may own the state by now.
            if state.pass == pass && state.pending.is_some() {
                state.pending = None;
                state.queue.clear();
            }
        }
        self.notify_changed();
    }
}
