//! User actions: sign-up, sign-in, OTP verification and sign-out.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::session::{SessionCookie, VerifiedSession};
use super::user::{AccountId, UserDocument};
use crate::backend::{create_session_client, unique_id, ClientFactory, Query};
use crate::config::{BackendConfig, WebConfig};
use crate::{Result, StoreItError};

/// Log a failed backend call and pass the error on.
pub(crate) fn log_failure(action: &'static str) -> impl FnOnce(StoreItError) -> StoreItError {
    move |e| {
        error!(error = %e, "{action}");
        e
    }
}

/// Account lookup, OTP dispatch and session lifecycle.
#[derive(Clone)]
pub struct UserService {
    factory: Arc<dyn ClientFactory>,
    backend: BackendConfig,
    avatar_placeholder: Option<String>,
}

impl UserService {
    pub fn new(factory: Arc<dyn ClientFactory>, backend: &BackendConfig, web: &WebConfig) -> Self {
        Self {
            factory,
            backend: backend.clone(),
            avatar_placeholder: web.avatar_placeholder_url.clone(),
        }
    }

    /// Find the user document with this email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDocument>> {
        let admin = self.factory.admin_client();
        let result = admin
            .databases
            .list_documents(
                &self.backend.database_id,
                &self.backend.users_collection_id,
                &[Query::equal("email", [email])],
            )
            .await
            .map_err(log_failure("Failed to look up user by email"))?;

        match result.documents.into_iter().next() {
            Some(doc) => Ok(Some(doc.parse()?)),
            None => Ok(None),
        }
    }

    /// Email an OTP and return the account id it was issued for.
    pub async fn send_email_otp(&self, email: &str) -> Result<String> {
        let admin = self.factory.admin_client();
        let token = admin
            .account
            .create_email_token(&unique_id(), email)
            .await
            .map_err(log_failure("Failed to send email OTP"))?;
        debug!(user_id = %token.user_id, "email OTP sent");
        Ok(token.user_id)
    }

    /// Sign up: send an OTP and create the user document on first use.
    ///
    /// An already registered email gets a fresh OTP but no second document.
    pub async fn create_account(&self, full_name: &str, email: &str) -> Result<AccountId> {
        let existing = self.get_user_by_email(email).await?;

        let account_id = self.send_email_otp(email).await?;
        if account_id.is_empty() {
            return Err(StoreItError::service(500, "Failed to send an OTP"));
        }

        if existing.is_none() {
            let admin = self.factory.admin_client();
            let avatar = match &self.avatar_placeholder {
                Some(url) => url.clone(),
                None => admin.avatars.initials_url(full_name),
            };

            let mut data = Map::new();
            data.insert("fullName".to_string(), Value::from(full_name));
            data.insert("email".to_string(), Value::from(email));
            data.insert("avatar".to_string(), Value::from(avatar));
            data.insert("accountId".to_string(), Value::from(account_id.as_str()));

            admin
                .databases
                .create_document(
                    &self.backend.database_id,
                    &self.backend.users_collection_id,
                    &unique_id(),
                    data,
                )
                .await
                .map_err(log_failure("Failed to create user document"))?;
            info!(account_id = %account_id, "user registered");
        }

        Ok(AccountId { account_id })
    }

    /// Sign in an existing user by emailing an OTP.
    pub async fn sign_in_user(&self, email: &str) -> Result<AccountId> {
        let Some(user) = self.get_user_by_email(email).await? else {
            return Err(StoreItError::NotFound("User".to_string()));
        };

        self.send_email_otp(email).await?;
        Ok(AccountId {
            account_id: user.account_id,
        })
    }

    /// Exchange an account id and OTP for a session.
    pub async fn verify_secret(&self, account_id: &str, password: &str) -> Result<VerifiedSession> {
        let admin = self.factory.admin_client();
        let session = admin
            .account
            .create_session(account_id, password)
            .await
            .map_err(log_failure("Failed to verify OTP"))?;
        info!(account_id, session_id = %session.id, "session created");

        Ok(VerifiedSession {
            session_id: session.id,
            cookie: SessionCookie::Set(session.secret),
        })
    }

    /// The user document of the signed-in account.
    ///
    /// `Ok(None)` means the account has no user document.
    pub async fn get_current_user(&self, session: Option<&str>) -> Result<Option<UserDocument>> {
        let client = create_session_client(self.factory.as_ref(), session)?;
        let account = client
            .account
            .get()
            .await
            .map_err(log_failure("Failed to get current account"))?;

        let result = client
            .databases
            .list_documents(
                &self.backend.database_id,
                &self.backend.users_collection_id,
                &[Query::equal("accountId", [account.id.as_str()])],
            )
            .await
            .map_err(log_failure("Failed to get current user"))?;

        match result.documents.into_iter().next() {
            Some(doc) => Ok(Some(doc.parse()?)),
            None => {
                warn!(account_id = %account.id, "account has no user document");
                Ok(None)
            }
        }
    }

    /// Delete the current session, ignoring failures. The cookie is
    /// always cleared.
    pub async fn sign_out_user(&self, session: Option<&str>) -> SessionCookie {
        let deleted = match create_session_client(self.factory.as_ref(), session) {
            Ok(client) => client.account.delete_session("current").await,
            Err(e) => Err(e),
        };
        if let Err(e) = deleted {
            warn!(error = %e, "Failed to sign out user");
        }
        SessionCookie::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn service(backend: &MemoryBackend) -> UserService {
        UserService::new(
            Arc::new(backend.clone()),
            &BackendConfig::memory(),
            &WebConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_account_creates_user_document() {
        let backend = MemoryBackend::new();
        let users = service(&backend);

        let result = users
            .create_account("Ada Lovelace", "ada@example.com")
            .await
            .unwrap();

        let user = users
            .get_user_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.account_id, result.account_id);
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(
            Some(user.avatar),
            WebConfig::default().avatar_placeholder_url
        );
        assert!(backend.last_otp("ada@example.com").await.is_some());
    }

    #[tokio::test]
    async fn test_create_account_initials_avatar_without_placeholder() {
        let backend = MemoryBackend::new();
        let web = WebConfig {
            avatar_placeholder_url: None,
            ..WebConfig::default()
        };
        let users = UserService::new(Arc::new(backend.clone()), &BackendConfig::memory(), &web);

        users.create_account("Ada", "ada@example.com").await.unwrap();
        let user = users
            .get_user_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.avatar.contains("/avatars/initials?name=Ada"));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_user() {
        let backend = MemoryBackend::new();
        let users = service(&backend);

        let err = users.sign_in_user("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, StoreItError::NotFound(ref what) if what == "User"));
        assert!(backend.documents("users").await.is_empty());
        assert!(backend.last_otp("nobody@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_verify_and_current_user() {
        let backend = MemoryBackend::new();
        let users = service(&backend);

        let AccountId { account_id } = users
            .create_account("Ada", "ada@example.com")
            .await
            .unwrap();
        let otp = backend.last_otp("ada@example.com").await.unwrap();

        let verified = users.verify_secret(&account_id, &otp).await.unwrap();
        let SessionCookie::Set(secret) = verified.cookie else {
            panic!("expected a session cookie");
        };

        let current = users.get_current_user(Some(&secret)).await.unwrap().unwrap();
        assert_eq!(current.email, "ada@example.com");

        assert_eq!(users.sign_out_user(Some(&secret)).await, SessionCookie::Clear);
        assert!(users.get_current_user(Some(&secret)).await.is_err());
    }

    #[tokio::test]
    async fn test_verify_wrong_otp_propagates() {
        let backend = MemoryBackend::new();
        let users = service(&backend);

        let AccountId { account_id } = users
            .create_account("Ada", "ada@example.com")
            .await
            .unwrap();
        let err = users.verify_secret(&account_id, "000000x").await.unwrap_err();
        assert_eq!(err.service_status(), Some(401));
    }

    #[tokio::test]
    async fn test_current_user_without_session() {
        let backend = MemoryBackend::new();
        let users = service(&backend);
        assert!(matches!(
            users.get_current_user(None).await,
            Err(StoreItError::Unauthenticated(_))
        ));
    }

    /// Log sink shared with a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_current_user_with_stale_session_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let backend = MemoryBackend::new();
        let users = service(&backend);
        let err = users.get_current_user(Some("stale")).await.unwrap_err();
        assert_eq!(err.service_status(), Some(401));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Failed to get current account"));
    }

    #[tokio::test]
    async fn test_sign_out_always_clears() {
        let backend = MemoryBackend::new();
        let users = service(&backend);
        assert_eq!(users.sign_out_user(None).await, SessionCookie::Clear);
        assert_eq!(
            users.sign_out_user(Some("stale")).await,
            SessionCookie::Clear
        );
    }
}
