//! View and download URLs of stored objects.

use crate::config::BackendConfig;

/// Builds public URLs for objects of the configured bucket.
#[derive(Debug, Clone)]
pub struct FileUrls {
    endpoint: String,
    bucket_id: String,
    project_id: String,
}

impl FileUrls {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket_id: config.bucket_id.clone(),
            project_id: config.project_id.clone(),
        }
    }

    /// URL that displays the object in the browser.
    pub fn construct_file_url(&self, bucket_file_id: &str) -> String {
        self.object_url(bucket_file_id, "view")
    }

    /// URL that downloads the object.
    pub fn construct_download_url(&self, bucket_file_id: &str) -> String {
        self.object_url(bucket_file_id, "download")
    }

    fn object_url(&self, bucket_file_id: &str, action: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/{}?project={}",
            self.endpoint, self.bucket_id, bucket_file_id, action, self.project_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> FileUrls {
        FileUrls::new(&BackendConfig {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: "proj".to_string(),
            bucket_id: "bucket".to_string(),
            ..BackendConfig::default()
        })
    }

    #[test]
    fn test_view_url() {
        assert_eq!(
            urls().construct_file_url("abc"),
            "https://cloud.appwrite.io/v1/storage/buckets/bucket/files/abc/view?project=proj"
        );
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            urls().construct_download_url("abc"),
            "https://cloud.appwrite.io/v1/storage/buckets/bucket/files/abc/download?project=proj"
        );
    }
}
