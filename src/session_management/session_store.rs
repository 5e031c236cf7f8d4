use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

use crate::session_management::session::Session;
use crate::session_management::DEFAULT_CHECK_PERIOD;

/// Storage for login sessions keyed by session id.
///
/// Expired sessions behave as absent for every read, whether or not a
/// purge has already removed them.
pub trait SessionStore: Send + Sync {
    /// Returns the live session for `sid`, if any.
    fn get(&self, sid: &str) -> Option<Session>;

    /// Inserts or replaces the session for `sid`, resetting its expiry.
    fn set(&self, sid: &str, data: serde_json::Value) -> Session;

    /// Refreshes the expiry of a live session. Returns `false` if absent.
    fn touch(&self, sid: &str) -> bool;

    /// Removes the session. Returns `false` if it was not stored.
    fn destroy(&self, sid: &str) -> bool;

    /// Number of stored entries, stale ones included until purged.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);

    /// Removes every expired session and returns how many were dropped.
    fn prune(&self) -> usize;

    /// How often a sweeper should call [`SessionStore::prune`].
    fn check_period(&self) -> Duration;
}

/// Process-local session store.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    max_age: chrono::Duration,
    check_period: Duration,
}

impl MemorySessionStore {
    pub fn new(check_period: Duration, max_age: chrono::Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_age,
            check_period,
        }
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.max_age)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_PERIOD, chrono::Duration::days(1))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, sid: &str) -> Option<Session> {
        let mut sessions = self.sessions();
        let now = Utc::now();
        match sessions.get(sid) {
            Some(session) if session.is_expired_at(now) => {
                debug!("Dropping expired session {}", sid);
                sessions.remove(sid);
                None
            }
            Some(session) => Some(session.clone()),
            None => None,
        }
    }

    fn set(&self, sid: &str, data: serde_json::Value) -> Session {
        let session = Session {
            id: sid.to_string(),
            data,
            expires_at: self.expiry_from(Utc::now()),
        };
        self.sessions().insert(sid.to_string(), session.clone());
        session
    }

    fn touch(&self, sid: &str) -> bool {
        let mut sessions = self.sessions();
        let now = Utc::now();
        match sessions.get_mut(sid) {
            Some(session) if !session.is_expired_at(now) => {
                session.expires_at = self.expiry_from(now);
                true
            }
            _ => false,
        }
    }

    fn destroy(&self, sid: &str) -> bool {
        self.sessions().remove(sid).is_some()
    }

    fn len(&self) -> usize {
        self.sessions().len()
    }

    fn clear(&self) {
        self.sessions().clear();
    }

    fn prune(&self) -> usize {
        let mut sessions = self.sessions();
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        before - sessions.len()
    }

    fn check_period(&self) -> Duration {
        self.check_period
    }
}
