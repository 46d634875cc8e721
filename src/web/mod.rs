//! Web API module for StoreIt.
//!
//! JSON endpoints for sign-in by email OTP, file management and storage
//! usage. The session travels in the `appwrite-session` cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
