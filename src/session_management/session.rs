use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored login session.
///
/// `data` is opaque to the store: the authentication layer decides what it
/// puts there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub data: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
