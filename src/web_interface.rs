// Web Interface module root
pub mod auth;
pub mod handlers;
pub mod routes;
pub mod types;
pub mod validation;
pub mod web_server;

// Re-export commonly used items
pub use routes::*;
pub use web_server::*;
