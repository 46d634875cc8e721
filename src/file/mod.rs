//! File management module for StoreIt.
//!
//! File content lives in the backend's storage bucket; each stored object
//! has a metadata document in the files collection. This module provides:
//! - Type classification and category mapping
//! - Listing queries with the owner-or-shared access rule
//! - Upload with rollback of the stored object, rename, sharing, delete
//! - Usage totals and human-readable sizes

mod document;
mod format;
mod query;
mod service;
mod types;
mod url;
mod usage;

pub use document::FileDocument;
pub use format::{calculate_percentage, convert_file_size, TOTAL_STORAGE_BYTES};
pub use query::{create_queries, sort_query, DEFAULT_SORT};
pub use service::{
    FileAction, FileActionOutcome, FileService, GetFilesRequest, Revalidated, UploadFileRequest,
};
pub use types::{file_types_for_category, get_file_type, FileType};
pub use url::FileUrls;
pub use usage::{usage_summary, SpaceByType, TotalSpace, UsageSummaryItem};
