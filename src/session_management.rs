//! Login session storage.
//!
//! The authentication layer persists sessions keyed by session id through a
//! [`SessionStore`]. The storage engine owns exactly one store for the whole
//! process lifetime; a background sweeper purges stale entries periodically.

/// Session record stored per session id.
pub mod session;
/// The `SessionStore` trait and its in-memory implementation.
pub mod session_store;
/// Periodic purge of expired sessions.
pub mod session_sweeper;

pub use session::Session;
pub use session_store::{MemorySessionStore, SessionStore};
pub use session_sweeper::spawn_sweeper;

/// Reference purge interval: once every 24 hours.
pub const DEFAULT_CHECK_PERIOD: std::time::Duration = std::time::Duration::from_secs(86_400);
