//! Backend service clients.
//!
//! Accounts, documents and file content live in an Appwrite-compatible
//! backend. This module defines the service seams as traits and the two
//! client flavours built on top of them:
//!
//! - [`SessionClient`]: acts as the signed-in end user (session secret).
//! - [`AdminClient`]: acts with the privileged secret key.
//!
//! Clients are built per request by a [`ClientFactory`]. Two factories
//! exist: [`AppwriteClientFactory`] (REST) and [`MemoryBackend`]
//! (in-process).

mod appwrite;
mod memory;
mod models;
mod query;

pub use appwrite::AppwriteClientFactory;
pub use memory::{BackendOp, MemoryBackend};
pub use models::{AccountInfo, Document, DocumentList, InputFile, Session, StoredFile, Token};
pub use query::Query;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{Result, StoreItError};

/// Account and session management.
#[async_trait]
pub trait Account: Send + Sync {
    /// Create an email OTP token; creates the account on first use.
    async fn create_email_token(&self, user_id: &str, email: &str) -> Result<Token>;

    /// Exchange an account id and OTP for a session.
    async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session>;

    /// The account of the current session.
    async fn get(&self) -> Result<AccountInfo>;

    /// Delete a session; `"current"` deletes the caller's own session.
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}

/// Document database.
#[async_trait]
pub trait Databases: Send + Sync {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document>;

    /// Merge `data` into an existing document.
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document>;

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()>;
}

/// Object storage.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_file(&self, bucket_id: &str, file_id: &str, file: InputFile)
        -> Result<StoredFile>;

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()>;
}

/// Avatar images.
pub trait Avatars: Send + Sync {
    /// URL of an initials avatar for `name`.
    fn initials_url(&self, name: &str) -> String;
}

/// Services available to a signed-in end user.
#[derive(Clone)]
pub struct SessionClient {
    pub account: Arc<dyn Account>,
    pub databases: Arc<dyn Databases>,
}

/// Services available with the privileged secret key.
#[derive(Clone)]
pub struct AdminClient {
    pub account: Arc<dyn Account>,
    pub databases: Arc<dyn Databases>,
    pub storage: Arc<dyn Storage>,
    pub avatars: Arc<dyn Avatars>,
}

/// Builds backend clients.
pub trait ClientFactory: Send + Sync {
    /// Client scoped to an end-user session secret.
    fn session_client(&self, session: &str) -> SessionClient;

    /// Client authenticated with the privileged secret key.
    fn admin_client(&self) -> AdminClient;
}

/// Build a session client, failing when there is no session secret.
pub fn create_session_client(
    factory: &dyn ClientFactory,
    session: Option<&str>,
) -> Result<SessionClient> {
    match session {
        Some(secret) if !secret.is_empty() => Ok(factory.session_client(secret)),
        _ => Err(StoreItError::Unauthenticated("No session".to_string())),
    }
}

/// Fresh identifier for new accounts, documents and files.
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_format() {
        let id = unique_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, unique_id());
    }

    #[test]
    fn test_create_session_client_requires_secret() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            create_session_client(&backend, None),
            Err(StoreItError::Unauthenticated(msg)) if msg == "No session"
        ));
        assert!(matches!(
            create_session_client(&backend, Some("")),
            Err(StoreItError::Unauthenticated(_))
        ));
        assert!(create_session_client(&backend, Some("secret")).is_ok());
    }
}
