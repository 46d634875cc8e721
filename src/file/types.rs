//! File type classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::StoreItError;

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xls", "xlsx", "csv", "rtf", "ods", "ppt", "odp", "md", "html",
    "htm", "epub", "pages", "fig", "psd", "ai", "indd", "xd", "sketch", "afdesign", "afphoto",
];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Broad category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Image,
    Video,
    Audio,
    Other,
}

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Document,
        FileType::Image,
        FileType::Video,
        FileType::Audio,
        FileType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Document => "document",
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Other => "other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = StoreItError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StoreItError::Validation(format!("unknown file type: {s}")))
    }
}

/// Classify a file name by its extension.
///
/// The extension is the text after the last `.`, lowercased; a name
/// without a dot is taken whole. Returns the type and the extension.
pub fn get_file_type(file_name: &str) -> (FileType, String) {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    if extension.is_empty() {
        return (FileType::Other, String::new());
    }

    let ext = extension.as_str();
    let file_type = if DOCUMENT_EXTENSIONS.contains(&ext) {
        FileType::Document
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        FileType::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        FileType::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        FileType::Audio
    } else {
        FileType::Other
    };

    (file_type, extension)
}

/// File types shown on a category page (`documents`, `images`, `media`,
/// `others`). Unknown categories show documents.
pub fn file_types_for_category(category: &str) -> Vec<FileType> {
    match category {
        "images" => vec![FileType::Image],
        "media" => vec![FileType::Video, FileType::Audio],
        "others" => vec![FileType::Other],
        _ => vec![FileType::Document],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_type_known_extensions() {
        assert_eq!(
            get_file_type("report.pdf"),
            (FileType::Document, "pdf".to_string())
        );
        assert_eq!(
            get_file_type("photo.JPG"),
            (FileType::Image, "jpg".to_string())
        );
        assert_eq!(
            get_file_type("clip.final.mkv"),
            (FileType::Video, "mkv".to_string())
        );
        assert_eq!(
            get_file_type("song.flac"),
            (FileType::Audio, "flac".to_string())
        );
        assert_eq!(
            get_file_type("design.afdesign"),
            (FileType::Document, "afdesign".to_string())
        );
    }

    #[test]
    fn test_get_file_type_other() {
        assert_eq!(
            get_file_type("archive.zip"),
            (FileType::Other, "zip".to_string())
        );
        // no dot: the whole name is the extension
        assert_eq!(
            get_file_type("Makefile"),
            (FileType::Other, "makefile".to_string())
        );
        assert_eq!(get_file_type("trailing."), (FileType::Other, String::new()));
        assert_eq!(get_file_type(""), (FileType::Other, String::new()));
    }

    #[test]
    fn test_file_types_for_category() {
        assert_eq!(file_types_for_category("documents"), vec![FileType::Document]);
        assert_eq!(file_types_for_category("images"), vec![FileType::Image]);
        assert_eq!(
            file_types_for_category("media"),
            vec![FileType::Video, FileType::Audio]
        );
        assert_eq!(file_types_for_category("others"), vec![FileType::Other]);
        assert_eq!(file_types_for_category("anything"), vec![FileType::Document]);
    }

    #[test]
    fn test_file_type_parse_and_serde() {
        assert_eq!("video".parse::<FileType>().unwrap(), FileType::Video);
        assert!("movie".parse::<FileType>().is_err());
        assert_eq!(serde_json::to_string(&FileType::Image).unwrap(), r#""image""#);
    }
}
