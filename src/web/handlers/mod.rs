//! API handlers for the web API.

pub mod auth;
pub mod file;
pub mod usage;

pub use auth::*;
pub use file::*;
pub use usage::*;

use std::sync::Arc;

use crate::auth::UserService;
use crate::backend::ClientFactory;
use crate::config::Config;
use crate::file::FileService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub files: FileService,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// Timezone for formatted dates.
    pub timezone: String,
}

impl AppState {
    /// Build the services on top of a backend client factory.
    pub fn new(factory: Arc<dyn ClientFactory>, config: &Config) -> Self {
        let users = UserService::new(factory.clone(), &config.backend, &config.web);
        let files = FileService::new(factory, users.clone(), &config.backend, &config.web);
        Self {
            users,
            files,
            secure_cookies: config.web.secure_cookies,
            timezone: config.web.timezone.clone(),
        }
    }
}
