//! File actions: upload, listing, rename, sharing, delete and usage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::auth::{log_failure, UserDocument, UserService};
use crate::backend::{unique_id, ClientFactory, DocumentList, InputFile, Query};
use crate::config::{BackendConfig, WebConfig};
use crate::{Result, StoreItError};

use super::document::FileDocument;
use super::query::{create_queries, DEFAULT_SORT};
use super::types::{get_file_type, FileType};
use super::url::FileUrls;
use super::usage::TotalSpace;

/// A file to upload on behalf of a user.
#[derive(Debug, Clone)]
pub struct UploadFileRequest {
    pub file: InputFile,
    /// User document id of the owner.
    pub owner_id: String,
    pub account_id: String,
    /// Page to refresh afterwards.
    pub path: String,
}

/// Listing criteria.
#[derive(Debug, Clone, Default)]
pub struct GetFilesRequest {
    pub types: Vec<FileType>,
    pub search_text: String,
    /// `<field>-<asc|desc>`; newest first when unset.
    pub sort: Option<String>,
    pub limit: Option<u64>,
}

/// A change to an existing file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum FileAction {
    /// Rename, keeping the given extension.
    Rename { name: String, extension: String },
    /// Replace the list of emails the file is shared with.
    Share { emails: Vec<String> },
    /// Delete the document and the stored object.
    Delete {
        #[serde(rename = "bucketFileId")]
        bucket_file_id: String,
    },
}

/// Result of a [`FileAction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileActionOutcome {
    Updated(FileDocument),
    Deleted { status: &'static str },
}

/// A mutation result together with the page that must be refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct Revalidated<T> {
    pub value: T,
    pub path: String,
}

/// File metadata and content management.
#[derive(Clone)]
pub struct FileService {
    factory: Arc<dyn ClientFactory>,
    users: UserService,
    backend: BackendConfig,
    urls: FileUrls,
    max_upload_size_mb: u64,
}

impl FileService {
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        users: UserService,
        backend: &BackendConfig,
        web: &WebConfig,
    ) -> Self {
        Self {
            factory,
            users,
            backend: backend.clone(),
            urls: FileUrls::new(backend),
            max_upload_size_mb: web.max_upload_size_mb,
        }
    }

    pub fn urls(&self) -> &FileUrls {
        &self.urls
    }

    /// Reject files over the upload limit.
    pub fn check_upload_size(&self, file: &InputFile) -> Result<()> {
        if file.len() as u64 > self.max_upload_size_mb * 1024 * 1024 {
            return Err(StoreItError::Validation(format!(
                "{} is too large. Max file size is {}MB.",
                file.name, self.max_upload_size_mb
            )));
        }
        Ok(())
    }

    /// Store the content, then record its metadata document.
    ///
    /// When the document cannot be created the stored object is deleted
    /// again before the error is returned.
    pub async fn upload_file(
        &self,
        request: UploadFileRequest,
    ) -> Result<Revalidated<FileDocument>> {
        self.check_upload_size(&request.file)?;

        let admin = self.factory.admin_client();
        let bucket_file = admin
            .storage
            .create_file(&self.backend.bucket_id, &unique_id(), request.file)
            .await
            .map_err(log_failure("Failed to upload file"))?;

        let (file_type, extension) = get_file_type(&bucket_file.name);
        let mut data = Map::new();
        data.insert("type".to_string(), Value::from(file_type.as_str()));
        data.insert("name".to_string(), Value::from(bucket_file.name.as_str()));
        data.insert(
            "url".to_string(),
            Value::from(self.urls.construct_file_url(&bucket_file.id)),
        );
        data.insert("extension".to_string(), Value::from(extension));
        data.insert("size".to_string(), Value::from(bucket_file.size_original));
        data.insert("owners".to_string(), Value::from(request.owner_id));
        data.insert("accountId".to_string(), Value::from(request.account_id));
        data.insert("users".to_string(), Value::Array(Vec::new()));
        data.insert("bucketFileId".to_string(), Value::from(bucket_file.id.as_str()));

        let created = admin
            .databases
            .create_document(
                &self.backend.database_id,
                &self.backend.files_collection_id,
                &unique_id(),
                data,
            )
            .await;

        let document = match created {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = admin
                    .storage
                    .delete_file(&self.backend.bucket_id, &bucket_file.id)
                    .await
                {
                    warn!(
                        error = %cleanup,
                        bucket_file_id = %bucket_file.id,
                        "Failed to remove stored object after failed upload"
                    );
                }
                error!(error = %e, "Failed to create file document");
                return Err(e);
            }
        };

        info!(file_id = %document.id, name = %bucket_file.name, "file uploaded");
        Ok(Revalidated {
            value: document.parse()?,
            path: request.path,
        })
    }

    /// Files visible to the signed-in user.
    pub async fn get_files(
        &self,
        session: Option<&str>,
        request: &GetFilesRequest,
    ) -> Result<DocumentList<FileDocument>> {
        let current_user = self.require_current_user(session).await?;

        let sort = request.sort.as_deref().unwrap_or(DEFAULT_SORT);
        let queries = create_queries(
            &current_user,
            &request.types,
            &request.search_text,
            sort,
            request.limit,
        );

        let admin = self.factory.admin_client();
        let files = admin
            .databases
            .list_documents(
                &self.backend.database_id,
                &self.backend.files_collection_id,
                &queries,
            )
            .await
            .map_err(log_failure("Failed to get files"))?;
        files.parse()
    }

    /// Set the name to `"{name}.{extension}"`.
    pub async fn rename_file(
        &self,
        file_id: &str,
        name: &str,
        extension: &str,
    ) -> Result<FileDocument> {
        let new_name = format!("{name}.{extension}");
        let mut data = Map::new();
        data.insert("name".to_string(), Value::from(new_name));
        self.update_file(file_id, data, "Failed to rename file").await
    }

    /// Replace the emails the file is shared with.
    pub async fn update_file_users(
        &self,
        file_id: &str,
        emails: &[String],
    ) -> Result<FileDocument> {
        let mut data = Map::new();
        data.insert("users".to_string(), Value::from(emails.to_vec()));
        self.update_file(file_id, data, "Failed to update file users")
            .await
    }

    /// Delete the metadata document, then the stored object.
    ///
    /// The object is only deleted once the document is gone; a failing
    /// object delete is reported but not undone.
    pub async fn delete_file(&self, file_id: &str, bucket_file_id: &str) -> Result<()> {
        let admin = self.factory.admin_client();
        admin
            .databases
            .delete_document(
                &self.backend.database_id,
                &self.backend.files_collection_id,
                file_id,
            )
            .await
            .map_err(log_failure("Failed to delete file document"))?;

        admin
            .storage
            .delete_file(&self.backend.bucket_id, bucket_file_id)
            .await
            .map_err(log_failure("Failed to delete stored object"))?;

        info!(file_id, bucket_file_id, "file deleted");
        Ok(())
    }

    /// Apply a rename, share or delete action.
    pub async fn apply_action(
        &self,
        file_id: &str,
        action: FileAction,
        path: String,
    ) -> Result<Revalidated<FileActionOutcome>> {
        let value = match action {
            FileAction::Rename { name, extension } => {
                FileActionOutcome::Updated(self.rename_file(file_id, &name, &extension).await?)
            }
            FileAction::Share { emails } => {
                FileActionOutcome::Updated(self.update_file_users(file_id, &emails).await?)
            }
            FileAction::Delete { bucket_file_id } => {
                self.delete_file(file_id, &bucket_file_id).await?;
                FileActionOutcome::Deleted { status: "success" }
            }
        };
        Ok(Revalidated { value, path })
    }

    /// Space used by the signed-in user's own files, per type.
    pub async fn get_total_space_used(&self, session: Option<&str>) -> Result<TotalSpace> {
        let current_user = self.require_current_user(session).await?;

        let admin = self.factory.admin_client();
        let files = admin
            .databases
            .list_documents(
                &self.backend.database_id,
                &self.backend.files_collection_id,
                &[Query::equal("owners", [current_user.id.as_str()])],
            )
            .await
            .map_err(log_failure("Error calculating total space used"))?;

        let files: DocumentList<FileDocument> = files.parse()?;
        Ok(TotalSpace::from_files(&files.documents))
    }

    /// The signed-in user; a session without user document is an error.
    pub async fn require_current_user(&self, session: Option<&str>) -> Result<UserDocument> {
        self.users
            .get_current_user(session)
            .await?
            .ok_or_else(|| StoreItError::NotFound("User".to_string()))
    }

    async fn update_file(
        &self,
        file_id: &str,
        data: Map<String, Value>,
        action: &'static str,
    ) -> Result<FileDocument> {
        let admin = self.factory.admin_client();
        let document = admin
            .databases
            .update_document(
                &self.backend.database_id,
                &self.backend.files_collection_id,
                file_id,
                data,
            )
            .await
            .map_err(log_failure(action))?;
        document.parse()
    }
}
