//! File metadata document.

use serde::{Deserialize, Serialize};

use super::types::FileType;

/// A row of the files collection describing one stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: String,
    /// Display name including the extension.
    pub name: String,
    pub extension: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
    /// View URL of the stored object.
    pub url: String,
    /// User document id of the owner.
    pub owners: String,
    pub account_id: String,
    /// Emails the file is shared with.
    #[serde(default)]
    pub users: Vec<String>,
    pub bucket_file_id: String,
}
