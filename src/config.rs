//! Configuration module for StoreIt.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, StoreItError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which backend implementation serves the account, database and storage APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// A remote Appwrite-compatible service over REST.
    Appwrite,
    /// The in-process backend (local development and tests).
    Memory,
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Backend implementation.
    #[serde(default = "default_backend_kind")]
    pub kind: BackendKind,
    /// Service endpoint, e.g. `https://cloud.appwrite.io/v1`.
    #[serde(default)]
    pub endpoint: String,
    /// Project identifier.
    #[serde(default)]
    pub project_id: String,
    /// Database holding the users and files collections.
    #[serde(default)]
    pub database_id: String,
    /// Collection of user documents.
    #[serde(default)]
    pub users_collection_id: String,
    /// Collection of file metadata documents.
    #[serde(default)]
    pub files_collection_id: String,
    /// Storage bucket for file content.
    #[serde(default)]
    pub bucket_id: String,
    /// Privileged API key used by the admin client.
    #[serde(default)]
    pub secret_key: String,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds (uploads included).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend_kind() -> BackendKind {
    BackendKind::Appwrite
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            endpoint: String::new(),
            project_id: String::new(),
            database_id: String::new(),
            users_collection_id: String::new(),
            files_collection_id: String::new(),
            bucket_id: String::new(),
            secret_key: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    /// Configuration for the in-process backend with fixed identifiers.
    pub fn memory() -> Self {
        Self {
            kind: BackendKind::Memory,
            endpoint: "http://localhost:3000/v1".to_string(),
            project_id: "storeit".to_string(),
            database_id: "storeit".to_string(),
            users_collection_id: "users".to_string(),
            files_collection_id: "files".to_string(),
            bucket_id: "files".to_string(),
            secret_key: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Mark the session cookie `Secure`. Only disable for plain-HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
    /// Maximum upload size per file in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Avatar assigned to new users. When unset, the avatars service
    /// initials image is used instead.
    #[serde(default = "default_avatar_placeholder")]
    pub avatar_placeholder_url: Option<String>,
    /// Timezone for human-readable dates (e.g., "UTC", "Europe/Berlin").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_secure_cookies() -> bool {
    true
}

fn default_max_upload_size() -> u64 {
    50
}

fn default_avatar_placeholder() -> Option<String> {
    Some(
        "https://img.freepik.com/free-psd/3d-illustration-person-with-sunglasses_23-2149436188.jpg"
            .to_string(),
    )
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            secure_cookies: default_secure_cookies(),
            max_upload_size_mb: default_max_upload_size(),
            avatar_placeholder_url: default_avatar_placeholder(),
            timezone: default_timezone(),
        }
    }
}

impl WebConfig {
    /// Maximum upload size per file in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend service configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Environment variables that override `[backend]` settings.
const BACKEND_ENV_OVERRIDES: &[&str] = &[
    "APPWRITE_ENDPOINT",
    "APPWRITE_PROJECT",
    "APPWRITE_DATABASE",
    "APPWRITE_USERS_COLLECTION",
    "APPWRITE_FILES_COLLECTION",
    "APPWRITE_BUCKET",
    "APPWRITE_SECRET",
];

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StoreItError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StoreItError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        for name in BACKEND_ENV_OVERRIDES {
            let Ok(value) = std::env::var(name) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let target = match *name {
                "APPWRITE_ENDPOINT" => &mut self.backend.endpoint,
                "APPWRITE_PROJECT" => &mut self.backend.project_id,
                "APPWRITE_DATABASE" => &mut self.backend.database_id,
                "APPWRITE_USERS_COLLECTION" => &mut self.backend.users_collection_id,
                "APPWRITE_FILES_COLLECTION" => &mut self.backend.files_collection_id,
                "APPWRITE_BUCKET" => &mut self.backend.bucket_id,
                _ => &mut self.backend.secret_key,
            };
            *target = value;
        }
    }

    /// Validate the configuration.
    ///
    /// An appwrite backend needs every identifier and the secret key.
    pub fn validate(&self) -> Result<()> {
        if self.web.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(StoreItError::Config(format!(
                "unknown timezone: {}",
                self.web.timezone
            )));
        }

        if self.backend.kind == BackendKind::Memory {
            return Ok(());
        }

        let required = [
            ("endpoint", &self.backend.endpoint, "APPWRITE_ENDPOINT"),
            ("project_id", &self.backend.project_id, "APPWRITE_PROJECT"),
            ("database_id", &self.backend.database_id, "APPWRITE_DATABASE"),
            (
                "users_collection_id",
                &self.backend.users_collection_id,
                "APPWRITE_USERS_COLLECTION",
            ),
            (
                "files_collection_id",
                &self.backend.files_collection_id,
                "APPWRITE_FILES_COLLECTION",
            ),
            ("bucket_id", &self.backend.bucket_id, "APPWRITE_BUCKET"),
            ("secret_key", &self.backend.secret_key, "APPWRITE_SECRET"),
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value, _)| value.is_empty())
            .map(|(key, _, env)| format!("backend.{key} ({env})"))
            .collect();

        if !missing.is_empty() {
            return Err(StoreItError::Config(format!(
                "missing backend settings: {}",
                missing.join(", ")
            )));
        }

        url::Url::parse(&self.backend.endpoint)
            .map_err(|e| StoreItError::Config(format!("invalid backend.endpoint: {e}")))?;

        Ok(())
    }
}
