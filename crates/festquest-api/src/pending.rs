//! Pending sticker requests.
//!
//! A guest first asks for a sticker, then uploads a photo. Between the two
//! the request is parked here, keyed by guest and stamped with the time it
//! was made. Requests older than the TTL are treated as absent.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use festquest_core::clock::Clock;
use festquest_core::ids::UserId;
use tracing::debug;

/// Keyed store of "awaiting sticker photo" intents.
#[derive(Debug)]
pub struct PendingIntents {
    armed: Mutex<HashMap<UserId, DateTime<Utc>>>,
    ttl: TimeDelta,
}

impl PendingIntents {
    /// Creates an empty store whose intents expire after `ttl`.
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            armed: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// How long an intent stays valid.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    // Entries are plain timestamps, so a poisoned map is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<UserId, DateTime<Utc>>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records that `user_id` is about to upload a photo. Re-arming
    /// refreshes the timestamp.
    pub fn arm(&self, user_id: UserId, clock: &dyn Clock) {
        self.entries().insert(user_id, clock.now());
        debug!(%user_id, "sticker request armed");
    }

    /// Whether `user_id` has a live intent.
    pub fn is_pending(&self, user_id: UserId, clock: &dyn Clock) -> bool {
        self.entries()
            .get(&user_id)
            .is_some_and(|armed_at| !clock.has_elapsed(*armed_at, self.ttl))
    }

    /// Consumes the intent for `user_id`. Returns `false` if there was none
    /// or it had expired.
    pub fn take(&self, user_id: UserId, clock: &dyn Clock) -> bool {
        self.entries()
            .remove(&user_id)
            .is_some_and(|armed_at| !clock.has_elapsed(armed_at, self.ttl))
    }

    /// Drops every expired intent. Returns how many were dropped.
    pub fn purge_expired(&self, clock: &dyn Clock) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, armed_at| !clock.has_elapsed(*armed_at, self.ttl));
        before - entries.len()
    }
}
