//! StoreIt - cloud file storage
//!
//! Email OTP sign-in, file upload, listing, sharing and usage summaries on
//! top of an Appwrite-style backend.

pub mod auth;
pub mod backend;
pub mod config;
pub mod datetime;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{AccountId, SessionCookie, UserDocument, UserService, VerifiedSession};
pub use config::Config;
pub use error::{Result, StoreItError};
pub use file::{FileAction, FileActionOutcome, FileDocument, FileService, FileType};
