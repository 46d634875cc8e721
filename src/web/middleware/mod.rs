//! Middleware for the web API.

pub mod cors;
pub mod session;

pub use cors::create_cors_layer;
pub use session::{apply_session_cookie, SessionSecret};
