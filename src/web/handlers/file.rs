//! File handlers for Web API.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use futures::future::join_all;
use std::sync::Arc;

use crate::backend::InputFile;
use crate::file::{FileActionOutcome, UploadFileRequest};
use crate::web::dto::{
    ApiResponse, FileActionRequest, FileListQuery, FileListResponse, FileView, RevalidateResponse,
    UploadResult,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionSecret;

/// GET /api/files - Files owned by or shared with the signed-in user.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    session: SessionSecret,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let request = query.into_request()?;
    let files = state
        .files
        .get_files(session.as_deref(), &request)
        .await
        .map_err(ApiError::failed("get files"))?;

    let urls = state.files.urls();
    let documents = files
        .documents
        .into_iter()
        .map(|doc| FileView::new(doc, urls, &state.timezone))
        .collect();

    Ok(Json(ApiResponse::new(FileListResponse {
        total: files.total,
        documents,
    })))
}

/// POST /api/files - Upload one or more files.
///
/// Request body: multipart/form-data with one or more "file" fields and an
/// optional "path" naming the page to refresh. Each file is reported on
/// its own; a failing file does not stop the others.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    session: SessionSecret,
    mut multipart: Multipart,
) -> Result<Json<RevalidateResponse<Vec<UploadResult>>>, ApiError> {
    let user = state
        .files
        .require_current_user(session.as_deref())
        .await
        .map_err(ApiError::failed("upload file"))?;

    let mut files: Vec<InputFile> = Vec::new();
    let mut path = "/".to_string();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ApiError::bad_request("File name is required"))?;
                let content_type = field.content_type().map(|s| s.to_string());
                let content = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read file content: {}", e);
                    ApiError::bad_request("Failed to read file")
                })?;

                let mut file = InputFile::from_bytes(content, filename);
                if let Some(content_type) = content_type {
                    file.mime_type = content_type;
                }
                files.push(file);
            }
            "path" => {
                let value = field.text().await.map_err(|e| {
                    tracing::error!("Failed to read path: {}", e);
                    ApiError::bad_request("Invalid path")
                })?;
                if !value.is_empty() {
                    path = value;
                }
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No file provided"));
    }

    let uploads = files.into_iter().map(|file| {
        let state = state.clone();
        let request = UploadFileRequest {
            file,
            owner_id: user.id.clone(),
            account_id: user.account_id.clone(),
            path: path.clone(),
        };
        async move {
            let name = request.file.name.clone();
            match state.files.upload_file(request).await {
                Ok(uploaded) => UploadResult::uploaded(
                    name,
                    FileView::new(uploaded.value, state.files.urls(), &state.timezone),
                ),
                Err(e) => {
                    let error = ApiError::failed("upload file")(e);
                    UploadResult::failed(name, error.message())
                }
            }
        }
    });
    let results = join_all(uploads).await;

    Ok(Json(RevalidateResponse {
        data: results,
        revalidate: path,
    }))
}

/// POST /api/files/:id/actions - Rename, share or delete a file.
pub async fn file_action(
    State(state): State<Arc<AppState>>,
    session: SessionSecret,
    Path(file_id): Path<String>,
    Json(req): Json<FileActionRequest>,
) -> Result<Json<RevalidateResponse<FileActionOutcome>>, ApiError> {
    state
        .files
        .require_current_user(session.as_deref())
        .await
        .map_err(ApiError::failed("update file"))?;

    let outcome = state
        .files
        .apply_action(&file_id, req.action, req.path)
        .await
        .map_err(ApiError::failed("update file"))?;

    Ok(Json(RevalidateResponse {
        data: outcome.value,
        revalidate: outcome.path,
    }))
}
