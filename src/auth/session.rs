//! Session cookie handling.
//!
//! Actions never write cookies themselves. They return a [`SessionCookie`]
//! effect and the web layer applies it to the response.

use serde::Serialize;

/// Name of the cookie holding the session secret.
pub const SESSION_COOKIE_NAME: &str = "appwrite-session";

/// Response-side change to the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCookie {
    /// Store the session secret.
    Set(String),
    /// Remove the session cookie.
    Clear,
}

/// Outcome of a successful OTP verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSession {
    pub session_id: String,
    #[serde(skip)]
    pub cookie: SessionCookie,
}
