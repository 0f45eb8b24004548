//! Per-session storage of random play games.

use std::{
    fmt,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::state::game::SessionRecord;

/// Opaque identifier carried by the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Allocate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

struct SessionEntry {
    record: SessionRecord,
    last_seen: Instant,
}

type SessionSlot = Arc<Mutex<SessionEntry>>;

/// Game state of every live session, keyed by [`SessionId`].
///
/// Each session sits behind its own async mutex: holding a [`SessionGuard`]
/// is the only way to read or write a session, so a read-modify-write never
/// interleaves with another request of the same session.
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionSlot>,
    ttl: Duration,
}

impl SessionStore {
    /// Store discarding sessions idle for longer than `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Wait for exclusive access to the session `id`, creating it when unknown.
    pub async fn lock(&self, id: SessionId) -> SessionGuard {
        loop {
            let slot = self
                .sessions
                .entry(id)
                .or_insert_with(|| {
                    Arc::new(Mutex::new(SessionEntry {
                        record: SessionRecord::default(),
                        last_seen: Instant::now(),
                    }))
                })
                .clone();

            let mut entry = slot.clone().lock_owned().await;

            // The slot may have been purged while we were waiting for it.
            let still_live = self
                .sessions
                .get(&id)
                .is_some_and(|current| Arc::ptr_eq(current.value(), &slot));
            if still_live {
                entry.last_seen = Instant::now();
                return SessionGuard { id, entry };
            }
        }
    }

    /// Drop every session idle for longer than the configured TTL.
    ///
    /// Sessions currently locked by a request are kept.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => now.saturating_duration_since(entry.last_seen) < self.ttl,
            Err(_) => true,
        });
        before.saturating_sub(self.sessions.len())
    }

    /// Number of sessions currently tracked.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is tracked.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Idle time after which a session is discarded.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Exclusive handle on one session's game state.
pub struct SessionGuard {
    id: SessionId,
    entry: OwnedMutexGuard<SessionEntry>,
}

impl SessionGuard {
    /// Session this guard belongs to.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Copy of the stored state; nothing changes until [`Self::save`].
    pub fn load(&self) -> SessionRecord {
        self.entry.record.clone()
    }

    /// Replace the stored state.
    pub fn save(&mut self, record: SessionRecord) {
        self.entry.record = record;
    }
}
