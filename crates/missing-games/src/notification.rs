//! Payload-free change notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Handle returned by [`NotificationSource::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

/// Observer list fired without a payload.
///
/// Synchronous observers register callbacks; async observers
/// [`subscribe`](Self::subscribe) to a counter that increments on every fire.
pub struct NotificationSource {
    callbacks: Mutex<Vec<(RegistrationId, Callback)>>,
    next_id: AtomicU64,
    fired: watch::Sender<u64>,
}

impl NotificationSource {
    pub fn new() -> Self {
        let (fired, _) = watch::channel(0);
        Self {
            callbacks: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            fired,
        }
    }

    /// Registers a callback run on every [`fire`](Self::fire).
    ///
    /// Callbacks run on the firing task; keep them short.
    pub fn register<F>(&self, callback: F) -> RegistrationId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|(registered, _)| *registered != id);
        callbacks.len() != before
    }

    /// Runs every registered callback and bumps the subscriber counter.
    pub fn fire(&self) {
        // Callbacks may register or unregister; don't hold the lock while
        // running them.
        let callbacks: Vec<Callback> = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback();
        }
        self.fired.send_modify(|count| *count += 1);
    }

    /// Returns a receiver whose value is the number of fires so far.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.fired.subscribe()
    }

    /// Number of fires so far.
    pub fn fire_count(&self) -> u64 {
        *self.fired.borrow()
    }
}

impl Default for NotificationSource {
    fn default() -> Self {
        Self::new()
    }
}
