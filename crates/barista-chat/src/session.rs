//! In-memory session store.
//!
//! Sessions live in a fixed number of shards keyed by a hash of the session
//! id, so turns for different sessions rarely contend on the same lock. Each
//! shard is an LRU cache with an idle TTL: entries untouched for longer than
//! the TTL read as absent and are dropped by [`ShardedSessionStore::prune_expired`].
//!
//! Concurrent turns for the same session are not serialized. Each turn reads
//! a snapshot and writes back its result, so the last write wins.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, error};

use barista_core::config::SessionConfig;

use crate::types::SessionState;

/// Storage for per-session memory.
pub trait SessionStore: Send + Sync {
    /// Current state for a session, if it exists and has not expired.
    fn get(&self, session_id: &str) -> Option<SessionState>;
    /// Current state for a session, atomically creating an empty session
    /// when it is missing or expired.
    fn get_or_insert(&self, session_id: &str) -> SessionState;
    /// Create or replace a session's state.
    fn put(&self, session_id: &str, state: SessionState);
    /// Forget a session. Returns whether it existed.
    fn remove(&self, session_id: &str) -> bool;
    /// Number of stored sessions, expired ones included until pruned.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    state: SessionState,
    touched_at: Instant,
}

type Shard = Mutex<LruCache<String, SessionEntry>>;

/// Sharded LRU session store with idle expiry.
pub struct ShardedSessionStore {
    shards: Vec<Shard>,
    ttl: Duration,
}

impl ShardedSessionStore {
    /// Create a store holding roughly `capacity` sessions across `shards`
    /// locks. Both are clamped to at least one.
    pub fn new(shards: usize, capacity: usize, ttl: Duration) -> Self {
        let shard_count = shards.max(1);
        let per_shard = capacity.max(1).div_ceil(shard_count);
        let per_shard = NonZeroUsize::new(per_shard).unwrap_or(NonZeroUsize::MIN);

        Self {
            shards: (0..shard_count)
                .map(|_| Mutex::new(LruCache::new(per_shard)))
                .collect(),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.shards,
            config.capacity,
            Duration::from_secs(u64::from(config.ttl_minutes) * 60),
        )
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in &self.shards {
            let mut cache = lock_shard(shard);
            let expired: Vec<String> = cache
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.touched_at) >= self.ttl)
                .map(|(key, _)| key.clone())
                .collect();
            for key in expired {
                cache.pop(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "Pruned expired sessions");
        }
        removed
    }

    fn shard_for(&self, session_id: &str) -> MutexGuard<'_, LruCache<String, SessionEntry>> {
        let mut hasher = DefaultHasher::new();
        session_id.hash(&mut hasher);
        let idx = (hasher.finish() % self.shards.len() as u64) as usize;
        lock_shard(&self.shards[idx])
    }
}

/// A panic while holding a shard lock cannot leave an entry half-written,
/// so a poisoned shard is still usable.
fn lock_shard(shard: &Shard) -> MutexGuard<'_, LruCache<String, SessionEntry>> {
    shard.lock().unwrap_or_else(|poisoned| {
        error!("Session shard lock poisoned; recovering");
        poisoned.into_inner()
    })
}

impl SessionStore for ShardedSessionStore {
    fn get(&self, session_id: &str) -> Option<SessionState> {
        let mut cache = self.shard_for(session_id);
        let now = Instant::now();
        let entry = cache.get_mut(session_id)?;
        if now.duration_since(entry.touched_at) >= self.ttl {
            cache.pop(session_id);
            debug!(session_id, "Session expired");
            return None;
        }
        entry.touched_at = now;
        Some(entry.state)
    }

    fn get_or_insert(&self, session_id: &str) -> SessionState {
        let mut cache = self.shard_for(session_id);
        let now = Instant::now();
        let entry = cache.get_or_insert_mut(session_id.to_string(), || {
            debug!(session_id, "Session created");
            SessionEntry {
                state: SessionState::default(),
                touched_at: now,
            }
        });
        if now.duration_since(entry.touched_at) >= self.ttl {
            debug!(session_id, "Session expired; starting fresh");
            entry.state = SessionState::default();
        }
        entry.touched_at = now;
        entry.state
    }

    fn put(&self, session_id: &str, state: SessionState) {
        let mut cache = self.shard_for(session_id);
        cache.put(
            session_id.to_string(),
            SessionEntry {
                state,
                touched_at: Instant::now(),
            },
        );
    }

    fn remove(&self, session_id: &str) -> bool {
        self.shard_for(session_id).pop(session_id).is_some()
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|s| lock_shard(s).len()).sum()
    }
}

impl std::fmt::Debug for ShardedSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedSessionStore")
            .field("shards", &self.shards.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
