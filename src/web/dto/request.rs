//! Request DTOs for the web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{not_empty_trimmed, valid_full_name};
use crate::file::{file_types_for_category, FileAction, FileType, GetFilesRequest};
use crate::web::error::ApiError;

/// Sign-up request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    /// Stored trimmed.
    #[validate(custom(function = "valid_full_name"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// OTP verification request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(custom(function = "not_empty_trimmed"))]
    pub account_id: String,
    /// The emailed passcode.
    #[validate(length(equal = 6, message = "OTP must be 6 characters"))]
    pub password: String,
}

/// Query string of `GET /api/files`.
#[derive(Debug, Default, Deserialize)]
pub struct FileListQuery {
    /// Comma separated file types; takes precedence over `category`.
    pub types: Option<String>,
    /// Category page: documents, images, media or others.
    pub category: Option<String>,
    /// Name substring.
    pub search: Option<String>,
    /// `<field>-<asc|desc>`.
    pub sort: Option<String>,
    pub limit: Option<u64>,
}

impl FileListQuery {
    /// Convert into listing criteria.
    pub fn into_request(self) -> Result<GetFilesRequest, ApiError> {
        let types = match (self.types.as_deref(), self.category.as_deref()) {
            (Some(types), _) if !types.is_empty() => types
                .split(',')
                .map(|t| t.trim().parse::<FileType>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
            (_, Some(category)) if !category.is_empty() => file_types_for_category(category),
            _ => Vec::new(),
        };

        Ok(GetFilesRequest {
            types,
            search_text: self.search.unwrap_or_default(),
            sort: self.sort.filter(|s| !s.is_empty()),
            limit: self.limit,
        })
    }
}

/// Body of `POST /api/files/{id}/actions`.
#[derive(Debug, Deserialize)]
pub struct FileActionRequest {
    #[serde(flatten)]
    pub action: FileAction,
    /// Page to refresh afterwards.
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "/".to_string()
}
