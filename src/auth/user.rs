//! User document type.

use serde::{Deserialize, Serialize};

/// A row of the users collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    /// Account service identifier of this user.
    pub account_id: String,
}

/// Account identifier handed back after an OTP was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountId {
    pub account_id: String,
}
