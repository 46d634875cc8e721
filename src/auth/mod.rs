//! Authentication module for StoreIt.
//!
//! Users sign in with an emailed one-time passcode:
//!
//! ```text
//! Anonymous --sign-up / sign-in--> OTP pending --verify--> Authenticated
//! Authenticated --sign-out--> Anonymous
//! ```
//!
//! Accounts and sessions are owned by the backend's account service; this
//! module keeps the user documents in step and hands session cookie changes
//! back to the web layer.

mod service;
mod session;
mod user;

pub(crate) use service::log_failure;
pub use service::UserService;
pub use session::{SessionCookie, VerifiedSession, SESSION_COOKIE_NAME};
pub use user::{AccountId, UserDocument};
