//! In-process backend.
//!
//! Implements the account, database, storage and avatars seams on shared
//! in-memory state. Used for local development (`backend.kind = "memory"`)
//! and by the test suite, which inspects the emitted OTPs, the stored
//! documents and the ordered log of mutating operations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rand::Rng;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{
    unique_id, Account, AccountInfo, AdminClient, Avatars, ClientFactory, Databases, Document,
    DocumentList, InputFile, Query, Session, SessionClient, Storage, StoredFile, Token,
};
use crate::config::BackendConfig;
use crate::{Result, StoreItError};

/// Mutating operation recorded by the memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    CreateEmailToken { email: String },
    CreateSession { user_id: String },
    DeleteSession { session_id: String },
    CreateDocument { collection_id: String, document_id: String },
    UpdateDocument { collection_id: String, document_id: String },
    DeleteDocument { collection_id: String, document_id: String },
    CreateFile { bucket_id: String, file_id: String },
    DeleteFile { bucket_id: String, file_id: String },
}

#[derive(Debug, Clone)]
struct AccountRecord {
    id: String,
    email: String,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    id: String,
    user_id: String,
}

#[derive(Debug, Clone)]
struct FileRecord {
    meta: StoredFile,
    content: Bytes,
}

#[derive(Default)]
struct State {
    /// Accounts keyed by email.
    accounts: HashMap<String, AccountRecord>,
    /// Pending OTP per account id.
    tokens: HashMap<String, String>,
    /// Last OTP sent per email.
    outbox: HashMap<String, String>,
    /// Sessions keyed by secret.
    sessions: HashMap<String, SessionRecord>,
    /// Documents per (database, collection), in insertion order.
    collections: HashMap<(String, String), Vec<Document>>,
    files: HashMap<(String, String), FileRecord>,
    ops: Vec<BackendOp>,
    fail_next_document_create: bool,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing millisecond timestamps.
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now().trunc_subsecs(3);
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts.to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    fn session(&self, secret: Option<&str>) -> Result<&SessionRecord> {
        secret
            .and_then(|s| self.sessions.get(s))
            .ok_or_else(|| {
                StoreItError::service(401, "User (role: guests) missing scope (account)")
            })
    }

    fn collection(&mut self, database_id: &str, collection_id: &str) -> &mut Vec<Document> {
        self.collections
            .entry((database_id.to_string(), collection_id.to_string()))
            .or_default()
    }
}

/// In-memory backend; cloning shares the state.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    endpoint: String,
    project_id: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_config(&BackendConfig::memory())
    }

    /// Backend whose avatar URLs use the configured endpoint and project.
    pub fn with_config(config: &BackendConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
        }
    }

    /// The last OTP emailed to `email`.
    pub async fn last_otp(&self, email: &str) -> Option<String> {
        self.state.lock().await.outbox.get(email).cloned()
    }

    /// Mutating operations in the order they happened.
    pub async fn operations(&self) -> Vec<BackendOp> {
        self.state.lock().await.ops.clone()
    }

    /// Make the next document creation fail with a service error.
    pub async fn fail_next_document_create(&self) {
        self.state.lock().await.fail_next_document_create = true;
    }

    /// Documents of a collection in insertion order, across databases.
    pub async fn documents(&self, collection_id: &str) -> Vec<Document> {
        let state = self.state.lock().await;
        state
            .collections
            .iter()
            .filter(|((_, col), _)| col == collection_id)
            .flat_map(|(_, docs)| docs.iter().cloned())
            .collect()
    }

    /// Metadata of the objects stored in a bucket.
    pub async fn stored_files(&self, bucket_id: &str) -> Vec<StoredFile> {
        let state = self.state.lock().await;
        state
            .files
            .iter()
            .filter(|((bucket, _), _)| bucket == bucket_id)
            .map(|(_, record)| record.meta.clone())
            .collect()
    }

    /// Content of a stored object.
    pub async fn file_content(&self, bucket_id: &str, file_id: &str) -> Option<Bytes> {
        let state = self.state.lock().await;
        state
            .files
            .get(&(bucket_id.to_string(), file_id.to_string()))
            .map(|record| record.content.clone())
    }

    fn handles(&self, session: Option<&str>) -> Handle {
        Handle {
            state: Arc::clone(&self.state),
            session: session.map(str::to_string),
            endpoint: self.endpoint.clone(),
            project_id: self.project_id.clone(),
        }
    }
}

impl ClientFactory for MemoryBackend {
    fn session_client(&self, session: &str) -> SessionClient {
        let handle = Arc::new(self.handles(Some(session)));
        SessionClient {
            account: handle.clone(),
            databases: handle,
        }
    }

    fn admin_client(&self) -> AdminClient {
        let handle = Arc::new(self.handles(None));
        AdminClient {
            account: handle.clone(),
            databases: handle.clone(),
            storage: handle.clone(),
            avatars: handle,
        }
    }
}

/// Service handle; `session` is `None` for the admin client.
struct Handle {
    state: Arc<Mutex<State>>,
    session: Option<String>,
    endpoint: String,
    project_id: String,
}

impl Handle {
    /// Session-scoped handles fail once their session is gone.
    fn authorize(&self, state: &State) -> Result<()> {
        if self.session.is_some() {
            state.session(self.session.as_deref())?;
        }
        Ok(())
    }
}

fn document_not_found() -> StoreItError {
    StoreItError::service(404, "Document with the requested ID could not be found.")
}

#[async_trait]
impl Account for Handle {
    async fn create_email_token(&self, user_id: &str, email: &str) -> Result<Token> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .entry(email.to_string())
            .or_insert_with(|| AccountRecord {
                id: user_id.to_string(),
                email: email.to_string(),
            })
            .clone();

        let otp = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        state.tokens.insert(account.id.clone(), otp.clone());
        state.outbox.insert(email.to_string(), otp);
        state.ops.push(BackendOp::CreateEmailToken {
            email: email.to_string(),
        });
        tracing::debug!(email, user_id = %account.id, "memory backend issued email OTP");

        Ok(Token {
            id: unique_id(),
            user_id: account.id,
            expire: String::new(),
        })
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session> {
        let mut state = self.state.lock().await;
        if state.tokens.get(user_id).map(String::as_str) != Some(secret) {
            return Err(StoreItError::service(
                401,
                "Invalid token passed in the request.",
            ));
        }
        state.tokens.remove(user_id);

        let session = Session {
            id: unique_id(),
            user_id: user_id.to_string(),
            secret: unique_id(),
            expire: String::new(),
        };
        state.sessions.insert(
            session.secret.clone(),
            SessionRecord {
                id: session.id.clone(),
                user_id: session.user_id.clone(),
            },
        );
        state.ops.push(BackendOp::CreateSession {
            user_id: user_id.to_string(),
        });
        Ok(session)
    }

    async fn get(&self) -> Result<AccountInfo> {
        let state = self.state.lock().await;
        let session = state.session(self.session.as_deref())?;
        state
            .accounts
            .values()
            .find(|account| account.id == session.user_id)
            .map(|account| AccountInfo {
                id: account.id.clone(),
                name: String::new(),
                email: account.email.clone(),
            })
            .ok_or_else(|| {
                StoreItError::service(404, "User with the requested ID could not be found.")
            })
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let current = state.session(self.session.as_deref())?.clone();
        if session_id != "current" && session_id != current.id {
            return Err(StoreItError::service(
                404,
                "The current user session could not be found.",
            ));
        }
        state
            .sessions
            .retain(|_, session| session.id != current.id);
        state.ops.push(BackendOp::DeleteSession {
            session_id: current.id,
        });
        Ok(())
    }
}

#[async_trait]
impl Databases for Handle {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let mut state = self.state.lock().await;
        self.authorize(&state)?;

        let mut documents: Vec<Document> = state
            .collection(database_id, collection_id)
            .iter()
            .filter(|doc| queries.iter().all(|query| matches(doc, query)))
            .cloned()
            .collect();
        let total = documents.len() as u64;

        // Later clauses are tie-breakers; stable sorts applied last-to-first.
        for query in queries.iter().rev() {
            match query {
                Query::OrderAsc(attribute) => {
                    documents.sort_by(|a, b| compare(&a.get(attribute), &b.get(attribute)));
                }
                Query::OrderDesc(attribute) => {
                    documents.reverse();
                    documents.sort_by(|a, b| compare(&a.get(attribute), &b.get(attribute)));
                    documents.reverse();
                }
                _ => {}
            }
        }

        let limit = queries.iter().rev().find_map(|query| match query {
            Query::Limit(n) => Some(*n as usize),
            _ => None,
        });
        if let Some(limit) = limit {
            documents.truncate(limit);
        }

        Ok(DocumentList { total, documents })
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let mut state = self.state.lock().await;
        self.authorize(&state)?;

        if std::mem::take(&mut state.fail_next_document_create) {
            return Err(StoreItError::service(
                500,
                "Server Error: document creation failed",
            ));
        }
        if state
            .collection(database_id, collection_id)
            .iter()
            .any(|doc| doc.id == document_id)
        {
            return Err(StoreItError::service(
                409,
                "Document with the requested ID already exists.",
            ));
        }

        let now = state.next_timestamp();
        let document = Document {
            id: document_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
            data,
        };
        state
            .collection(database_id, collection_id)
            .push(document.clone());
        state.ops.push(BackendOp::CreateDocument {
            collection_id: collection_id.to_string(),
            document_id: document_id.to_string(),
        });
        Ok(document)
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let mut state = self.state.lock().await;
        self.authorize(&state)?;

        let now = state.next_timestamp();
        let document = state
            .collection(database_id, collection_id)
            .iter_mut()
            .find(|doc| doc.id == document_id)
            .ok_or_else(document_not_found)?;
        document.data.extend(data);
        document.updated_at = now;
        let updated = document.clone();

        state.ops.push(BackendOp::UpdateDocument {
            collection_id: collection_id.to_string(),
            document_id: document_id.to_string(),
        });
        Ok(updated)
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        self.authorize(&state)?;

        let documents = state.collection(database_id, collection_id);
        let before = documents.len();
        documents.retain(|doc| doc.id != document_id);
        if documents.len() == before {
            return Err(document_not_found());
        }

        state.ops.push(BackendOp::DeleteDocument {
            collection_id: collection_id.to_string(),
            document_id: document_id.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl Storage for Handle {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
    ) -> Result<StoredFile> {
        let mut state = self.state.lock().await;
        let key = (bucket_id.to_string(), file_id.to_string());
        if state.files.contains_key(&key) {
            return Err(StoreItError::service(
                409,
                "A storage file with the requested ID already exists.",
            ));
        }

        let meta = StoredFile {
            id: file_id.to_string(),
            bucket_id: bucket_id.to_string(),
            name: file.name,
            mime_type: file.mime_type,
            size_original: file.content.len() as u64,
            created_at: state.next_timestamp(),
        };
        state.files.insert(
            key,
            FileRecord {
                meta: meta.clone(),
                content: file.content,
            },
        );
        state.ops.push(BackendOp::CreateFile {
            bucket_id: bucket_id.to_string(),
            file_id: file_id.to_string(),
        });
        Ok(meta)
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state
            .files
            .remove(&(bucket_id.to_string(), file_id.to_string()))
            .is_none()
        {
            return Err(StoreItError::service(
                404,
                "The requested file could not be found.",
            ));
        }
        state.ops.push(BackendOp::DeleteFile {
            bucket_id: bucket_id.to_string(),
            file_id: file_id.to_string(),
        });
        Ok(())
    }
}

impl Avatars for Handle {
    fn initials_url(&self, name: &str) -> String {
        format!(
            "{}/avatars/initials?name={}&project={}",
            self.endpoint,
            urlencoding::encode(name),
            urlencoding::encode(&self.project_id)
        )
    }
}

/// Whether a document satisfies a filter clause. Ordering and limit
/// clauses always match.
fn matches(doc: &Document, query: &Query) -> bool {
    match query {
        Query::Equal { attribute, values } => match doc.get(attribute) {
            Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
            Some(value) => values.contains(&value),
            None => false,
        },
        Query::Contains { attribute, values } => match doc.get(attribute) {
            Some(Value::String(text)) => values
                .iter()
                .filter_map(Value::as_str)
                .any(|needle| text.contains(needle)),
            Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
            _ => false,
        },
        Query::Or(queries) => queries.iter().any(|q| matches(doc, q)),
        Query::And(queries) => queries.iter().all(|q| matches(doc, q)),
        Query::Limit(_) | Query::OrderAsc(_) | Query::OrderDesc(_) => true,
    }
}

/// Order attribute values; missing values sort first.
fn compare(a: &Option<Value>, b: &Option<Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
