//! In-memory session maps with idle expiry
//!
//! Lot builder sessions and import previews are held per id until the client
//! removes them. Anything left idle longer than the map's TTL is dropped the
//! next time a new entry is inserted.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Idle time after which lot sessions and previews are dropped
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug)]
struct Entry<T> {
    value: T,
    touched_at: Instant,
}

/// Values keyed by session id, swept for stale entries on insert
#[derive(Debug)]
pub struct SessionMap<T> {
    entries: HashMap<Uuid, Entry<T>>,
    ttl: Duration,
    kind: &'static str,
}

impl<T> SessionMap<T> {
    pub fn new(kind: &'static str, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            kind,
        }
    }

    /// Store `value` under `id` after dropping expired entries
    ///
    /// Returns how many entries were dropped.
    pub fn insert(&mut self, id: Uuid, value: T) -> usize {
        let evicted = self.evict_expired();
        self.entries.insert(
            id,
            Entry {
                value,
                touched_at: Instant::now(),
            },
        );
        evicted
    }

    pub fn get(&self, id: &Uuid) -> Option<&T> {
        self.entries.get(id).map(|e| &e.value)
    }

    /// Mutable access; counts as activity
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut T> {
        self.entries.get_mut(id).map(|e| {
            e.touched_at = Instant::now();
            &mut e.value
        })
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<T> {
        self.entries.remove(id).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| now.duration_since(e.touched_at) < ttl);

        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(kind = self.kind, evicted, "Dropped idle sessions");
        }
        evicted
    }
}
