//! REST client for an Appwrite-compatible backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    Account, AccountInfo, AdminClient, Avatars, ClientFactory, Databases, Document, DocumentList,
    InputFile, Query, Session, SessionClient, Storage, StoredFile, Token,
};
use crate::config::BackendConfig;
use crate::{Result, StoreItError};

/// Response format the payload models are written against.
const RESPONSE_FORMAT: &str = "1.5.0";

/// Uploads larger than this are sent in ranged chunks.
const CHUNK_SIZE: usize = 5 * 1024 * 1024;

const USER_AGENT: &str = concat!("StoreIt/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
}

/// Builds REST clients sharing one connection pool.
#[derive(Clone)]
pub struct AppwriteClientFactory {
    http: Client,
    endpoint: String,
    project_id: String,
    secret_key: String,
}

impl AppwriteClientFactory {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreItError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn rest(&self, credential: Credential) -> Arc<Rest> {
        Arc::new(Rest {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            project_id: self.project_id.clone(),
            credential,
        })
    }
}

impl ClientFactory for AppwriteClientFactory {
    fn session_client(&self, session: &str) -> SessionClient {
        let rest = self.rest(Credential::Session(session.to_string()));
        SessionClient {
            account: rest.clone(),
            databases: rest,
        }
    }

    fn admin_client(&self) -> AdminClient {
        let rest = self.rest(Credential::Key(self.secret_key.clone()));
        AdminClient {
            account: rest.clone(),
            databases: rest.clone(),
            storage: rest.clone(),
            avatars: rest,
        }
    }
}

enum Credential {
    Session(String),
    Key(String),
}

struct Rest {
    http: Client,
    endpoint: String,
    project_id: String,
    credential: Credential,
}

impl Rest {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.endpoint, path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT);

        match &self.credential {
            Credential::Session(secret) => builder.header("X-Appwrite-Session", secret),
            Credential::Key(key) => builder.header("X-Appwrite-Key", key),
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        check(builder.send().await?).await?;
        Ok(())
    }

    fn documents_path(database_id: &str, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            urlencoding::encode(database_id),
            urlencoding::encode(collection_id)
        )
    }

    fn document_path(database_id: &str, collection_id: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            Self::documents_path(database_id, collection_id),
            urlencoding::encode(document_id)
        )
    }
}

/// Turn a non-success response into a service error.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServiceErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    Err(StoreItError::service(status.as_u16(), message))
}

fn file_part(file: &InputFile, content: bytes::Bytes) -> Result<Part> {
    let length = content.len() as u64;
    Ok(Part::stream_with_length(content, length)
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)?)
}

#[async_trait]
impl Account for Rest {
    async fn create_email_token(&self, user_id: &str, email: &str) -> Result<Token> {
        let builder = self
            .request(Method::POST, "/account/tokens/email")
            .json(&json!({ "userId": user_id, "email": email }));
        self.send(builder).await
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session> {
        let builder = self
            .request(Method::POST, "/account/sessions/token")
            .json(&json!({ "userId": user_id, "secret": secret }));
        self.send(builder).await
    }

    async fn get(&self) -> Result<AccountInfo> {
        self.send(self.request(Method::GET, "/account")).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let path = format!("/account/sessions/{}", urlencoding::encode(session_id));
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}

#[async_trait]
impl Databases for Rest {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_string()))
            .collect();
        let builder = self
            .request(Method::GET, &Self::documents_path(database_id, collection_id))
            .query(&params);
        self.send(builder).await
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let builder = self
            .request(Method::POST, &Self::documents_path(database_id, collection_id))
            .json(&json!({ "documentId": document_id, "data": data }));
        self.send(builder).await
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document> {
        let path = Self::document_path(database_id, collection_id, document_id);
        let builder = self
            .request(Method::PATCH, &path)
            .json(&json!({ "data": data }));
        self.send(builder).await
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        let path = Self::document_path(database_id, collection_id, document_id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}

#[async_trait]
impl Storage for Rest {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
    ) -> Result<StoredFile> {
        let path = format!("/storage/buckets/{}/files", urlencoding::encode(bucket_id));
        let total = file.content.len();

        if total <= CHUNK_SIZE {
            let form = Form::new()
                .text("fileId", file_id.to_string())
                .part("file", file_part(&file, file.content.clone())?);
            return self
                .send(self.request(Method::POST, &path).multipart(form))
                .await;
        }

        // Large uploads go in ranged chunks; the service assembles them
        // under the id announced from the second chunk on.
        let mut start = 0;
        let mut stored = None;
        while start < total {
            let end = (start + CHUNK_SIZE).min(total);
            let form = Form::new()
                .text("fileId", file_id.to_string())
                .part("file", file_part(&file, file.content.slice(start..end))?);
            let mut builder = self
                .request(Method::POST, &path)
                .header("Content-Range", format!("bytes {}-{}/{}", start, end - 1, total))
                .multipart(form);
            if start > 0 {
                builder = builder.header("X-Appwrite-ID", file_id);
            }
            stored = Some(self.send::<StoredFile>(builder).await?);
            start = end;
        }

        stored.ok_or_else(|| StoreItError::Validation("empty upload".to_string()))
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        let path = format!(
            "/storage/buckets/{}/files/{}",
            urlencoding::encode(bucket_id),
            urlencoding::encode(file_id)
        );
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}

impl Avatars for Rest {
    fn initials_url(&self, name: &str) -> String {
        format!(
            "{}/avatars/initials?name={}&project={}",
            self.endpoint,
            urlencoding::encode(name),
            urlencoding::encode(&self.project_id)
        )
    }
}
