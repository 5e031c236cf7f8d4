pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod session_management;
pub mod storage;
pub mod web_interface;

pub use session_management::{MemorySessionStore, SessionStore};
pub use storage::{MemStorage, Storage};
