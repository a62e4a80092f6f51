//! Per-event write serialization.
//!
//! [`EventLocks`] keeps one [`tokio::sync::Mutex`] per event so that
//! read-validate-append-write sequences for the same event run one at a
//! time inside this process, while writes to different events proceed
//! concurrently. Across processes the store's version check still
//! applies.
//!
//! Entries live only while someone holds or waits for them:
//! [`EventLocks::release`] drops an entry once its last user is done, so
//! requests for unknown events leave nothing behind.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::EventId;

/// Lock table keyed by [`EventId`].
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and a per-entry
/// `Arc<Mutex<()>>` so that holding one event's lock never blocks
/// another event.
#[derive(Debug, Default)]
pub struct EventLocks {
    locks: RwLock<HashMap<EventId, Arc<Mutex<()>>>>,
}

/// Exclusive write access to one event.
#[derive(Debug)]
pub struct EventLockGuard {
    event_id: EventId,
    guard: OwnedMutexGuard<()>,
}

impl EventLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `event_id`.
    ///
    /// Hand the guard back through [`EventLocks::release`]. Dropping it
    /// also unlocks, but keeps the table entry.
    pub async fn acquire(&self, event_id: EventId) -> EventLockGuard {
        let guard = self.entry(event_id).await.lock_owned().await;
        EventLockGuard { event_id, guard }
    }

    /// Unlocks and removes the entry if no other task holds or awaits it.
    pub async fn release(&self, lock: EventLockGuard) {
        let EventLockGuard { event_id, guard } = lock;
        drop(guard);
        let mut map = self.locks.write().await;
        if map
            .get(&event_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            map.remove(&event_id);
        }
    }

    async fn entry(&self, event_id: EventId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&event_id) {
            return Arc::clone(lock);
        }
        let mut map = self.locks.write().await;
        Arc::clone(map.entry(event_id).or_default())
    }

    /// Returns the number of events with a lock entry.
    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Returns `true` if no lock entries exist.
    pub async fn is_empty(&self) -> bool {
        self.locks.read().await.is_empty()
    }
}
