//! Storage usage aggregation.

use serde::Serialize;

use super::document::FileDocument;
use super::format::TOTAL_STORAGE_BYTES;
use super::types::FileType;

/// Bytes used by one file type and the latest change among those files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceByType {
    pub size: u64,
    /// `$updatedAt` of the most recently changed file; empty when none.
    pub latest_date: String,
}

impl SpaceByType {
    fn add(&mut self, file: &FileDocument) {
        self.size += file.size;
        if self.latest_date.is_empty() || file.updated_at > self.latest_date {
            self.latest_date = file.updated_at.clone();
        }
    }
}

/// Space used by a user's own files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalSpace {
    pub image: SpaceByType,
    pub document: SpaceByType,
    pub video: SpaceByType,
    pub audio: SpaceByType,
    pub other: SpaceByType,
    pub used: u64,
    pub all: u64,
}

impl Default for TotalSpace {
    fn default() -> Self {
        Self {
            image: SpaceByType::default(),
            document: SpaceByType::default(),
            video: SpaceByType::default(),
            audio: SpaceByType::default(),
            other: SpaceByType::default(),
            used: 0,
            all: TOTAL_STORAGE_BYTES,
        }
    }
}

impl TotalSpace {
    /// Sum file sizes per type.
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FileDocument>) -> Self {
        let mut total = Self::default();
        for file in files {
            total.by_type_mut(file.file_type).add(file);
            total.used += file.size;
        }
        total
    }

    fn by_type_mut(&mut self, file_type: FileType) -> &mut SpaceByType {
        match file_type {
            FileType::Image => &mut self.image,
            FileType::Document => &mut self.document,
            FileType::Video => &mut self.video,
            FileType::Audio => &mut self.audio,
            FileType::Other => &mut self.other,
        }
    }
}

/// One dashboard card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummaryItem {
    pub title: &'static str,
    pub size: u64,
    pub latest_date: String,
    /// Category page listing these files.
    pub url: &'static str,
}

/// Dashboard cards: documents, images, media (video and audio), others.
pub fn usage_summary(total: &TotalSpace) -> Vec<UsageSummaryItem> {
    let media_date = if total.video.latest_date > total.audio.latest_date {
        &total.video.latest_date
    } else {
        &total.audio.latest_date
    };

    vec![
        UsageSummaryItem {
            title: "Documents",
            size: total.document.size,
            latest_date: total.document.latest_date.clone(),
            url: "/documents",
        },
        UsageSummaryItem {
            title: "Images",
            size: total.image.size,
            latest_date: total.image.latest_date.clone(),
            url: "/images",
        },
        UsageSummaryItem {
            title: "Media",
            size: total.video.size + total.audio.size,
            latest_date: media_date.clone(),
            url: "/media",
        },
        UsageSummaryItem {
            title: "Others",
            size: total.other.size,
            latest_date: total.other.latest_date.clone(),
            url: "/others",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(file_type: FileType, size: u64, updated_at: &str) -> FileDocument {
        FileDocument {
            id: "f".to_string(),
            created_at: updated_at.to_string(),
            updated_at: updated_at.to_string(),
            name: "f".to_string(),
            extension: String::new(),
            file_type,
            size,
            url: String::new(),
            owners: "u1".to_string(),
            account_id: "acc1".to_string(),
            users: vec![],
            bucket_file_id: "obj".to_string(),
        }
    }

    #[test]
    fn test_totals_per_type() {
        let files = vec![
            file(FileType::Document, 100, "2024-01-01T00:00:00.000+00:00"),
            file(FileType::Document, 50, "2024-03-01T00:00:00.000+00:00"),
            file(FileType::Image, 30, "2024-02-01T00:00:00.000+00:00"),
        ];
        let total = TotalSpace::from_files(&files);

        assert_eq!(total.document.size, 150);
        assert_eq!(total.document.latest_date, "2024-03-01T00:00:00.000+00:00");
        assert_eq!(total.image.size, 30);
        assert_eq!(total.video, SpaceByType::default());
        assert_eq!(total.used, 180);
        assert_eq!(total.all, TOTAL_STORAGE_BYTES);
    }

    #[test]
    fn test_summary_combines_media() {
        let files = vec![
            file(FileType::Video, 1000, "2024-01-01T00:00:00.000+00:00"),
            file(FileType::Audio, 24, "2024-05-01T00:00:00.000+00:00"),
        ];
        let summary = usage_summary(&TotalSpace::from_files(&files));

        let titles: Vec<&str> = summary.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Documents", "Images", "Media", "Others"]);

        let media = &summary[2];
        assert_eq!(media.size, 1024);
        assert_eq!(media.latest_date, "2024-05-01T00:00:00.000+00:00");
        assert_eq!(media.url, "/media");
        assert_eq!(summary[0].latest_date, "");
    }
}
