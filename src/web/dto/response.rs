//! Response DTOs for the web API.

use serde::Serialize;

use crate::datetime::format_date_time;
use crate::file::{
    calculate_percentage, convert_file_size, usage_summary, FileDocument, FileUrls, TotalSpace,
    UsageSummaryItem,
};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Response of a mutation, naming the page the client should refresh.
#[derive(Debug, Serialize)]
pub struct RevalidateResponse<T: Serialize> {
    pub data: T,
    pub revalidate: String,
}

// ============================================================================
// Auth
// ============================================================================

/// OTP verification response. The session secret travels in the cookie only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub session_id: String,
    pub redirect_to: String,
}

// ============================================================================
// Files
// ============================================================================

/// A file document with display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    #[serde(flatten)]
    pub document: FileDocument,
    pub formatted_size: String,
    pub formatted_date: String,
    pub download_url: String,
}

impl FileView {
    pub fn new(document: FileDocument, urls: &FileUrls, timezone: &str) -> Self {
        Self {
            formatted_size: convert_file_size(document.size, None),
            formatted_date: format_date_time(Some(document.created_at.as_str()), timezone),
            download_url: urls.construct_download_url(&document.bucket_file_id),
            document,
        }
    }
}

/// File listing.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub total: u64,
    pub documents: Vec<FileView>,
}

/// Outcome of one uploaded file.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    pub fn uploaded(name: String, file: FileView) -> Self {
        Self {
            name,
            file: Some(file),
            error: None,
        }
    }

    pub fn failed(name: String, error: impl Into<String>) -> Self {
        Self {
            name,
            file: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Usage
// ============================================================================

/// Dashboard card with display fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCard {
    #[serde(flatten)]
    pub item: UsageSummaryItem,
    pub formatted_size: String,
    pub formatted_date: String,
}

/// Storage usage overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub total: TotalSpace,
    pub summary: Vec<UsageCard>,
    /// Share of the quota in percent.
    pub used_percentage: f64,
    pub formatted_used: String,
    pub formatted_all: String,
}

impl UsageResponse {
    pub fn new(total: TotalSpace, timezone: &str) -> Self {
        let summary = usage_summary(&total)
            .into_iter()
            .map(|item| UsageCard {
                formatted_size: convert_file_size(item.size, None),
                formatted_date: format_date_time(Some(item.latest_date.as_str()), timezone),
                item,
            })
            .collect();

        Self {
            summary,
            used_percentage: calculate_percentage(total.used),
            formatted_used: convert_file_size(total.used, None),
            formatted_all: convert_file_size(total.all, None),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::file::FileType;

    #[test]
    fn test_api_response_wrapper() {
        let json = serde_json::to_value(ApiResponse::new("x")).unwrap();
        assert_eq!(json, serde_json::json!({"data": "x"}));
    }

    #[test]
    fn test_file_view_display_fields() {
        let document = FileDocument {
            id: "f1".to_string(),
            created_at: "2024-07-15T15:45:00.000+00:00".to_string(),
            updated_at: "2024-07-15T15:45:00.000+00:00".to_string(),
            name: "report.pdf".to_string(),
            extension: "pdf".to_string(),
            file_type: FileType::Document,
            size: 2048,
            url: String::new(),
            owners: "u1".to_string(),
            account_id: "acc1".to_string(),
            users: vec![],
            bucket_file_id: "obj1".to_string(),
        };
        let view = FileView::new(document, &FileUrls::new(&BackendConfig::memory()), "UTC");
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["name"], "report.pdf");
        assert_eq!(json["formattedSize"], "2.0 KB");
        assert_eq!(json["formattedDate"], "3:45pm, 15 Jul");
        assert_eq!(
            json["downloadUrl"],
            "http://localhost:3000/v1/storage/buckets/files/files/obj1/download?project=storeit"
        );
    }

    #[test]
    fn test_usage_response_empty() {
        let usage = UsageResponse::new(TotalSpace::default(), "UTC");
        assert_eq!(usage.summary.len(), 4);
        assert_eq!(usage.used_percentage, 0.0);
        assert_eq!(usage.formatted_all, "2.0 GB");
        assert_eq!(usage.summary[0].formatted_date, "—");
    }
}
