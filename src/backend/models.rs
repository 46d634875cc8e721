//! Payloads exchanged with the backend service.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// A database document: service-managed fields plus free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Attribute value by name, including the `$`-prefixed service fields.
    pub fn get(&self, attribute: &str) -> Option<Value> {
        match attribute {
            "$id" => Some(Value::from(self.id.as_str())),
            "$createdAt" => Some(Value::from(self.created_at.as_str())),
            "$updatedAt" => Some(Value::from(self.updated_at.as_str())),
            _ => self.data.get(attribute).cloned(),
        }
    }

    /// Convert into a typed document view.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }
}

/// Result of a document list request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList<T = Document> {
    /// Number of documents matching the filters (before `limit`).
    pub total: u64,
    pub documents: Vec<T>,
}

impl DocumentList<Document> {
    /// Convert every document into a typed view.
    pub fn parse<T: DeserializeOwned>(self) -> Result<DocumentList<T>> {
        let documents = self
            .documents
            .into_iter()
            .map(Document::parse)
            .collect::<Result<Vec<T>>>()?;
        Ok(DocumentList {
            total: self.total,
            documents,
        })
    }
}

/// Email OTP token returned by the account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "$id")]
    pub id: String,
    /// Account the OTP was issued for.
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub expire: String,
}

/// Session created from an account id and OTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Opaque session secret; only returned to privileged callers.
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub expire: String,
}

/// The account behind a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A stored bucket object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId", default)]
    pub bucket_id: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    /// Size of the uploaded content in bytes.
    #[serde(rename = "sizeOriginal")]
    pub size_original: u64,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
}

/// Binary content to upload, with its file name.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub content: Bytes,
    pub mime_type: String,
}

impl InputFile {
    /// Wrap a buffer; the MIME type is guessed from the file name.
    pub fn from_bytes(content: impl Into<Bytes>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            name,
            content: content.into(),
            mime_type,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(rename = "$id")]
        id: String,
        name: String,
    }

    fn sample() -> Document {
        serde_json::from_value(json!({
            "$id": "doc1",
            "$createdAt": "2024-01-01T00:00:00.000+00:00",
            "$updatedAt": "2024-01-02T00:00:00.000+00:00",
            "$collectionId": "files",
            "name": "a.pdf",
            "size": 10
        }))
        .unwrap()
    }

    #[test]
    fn test_document_flattens_attributes() {
        let doc = sample();
        assert_eq!(doc.id, "doc1");
        assert_eq!(doc.get("name"), Some(json!("a.pdf")));
        assert_eq!(doc.get("$collectionId"), Some(json!("files")));
        assert_eq!(doc.get("$createdAt"), Some(json!("2024-01-01T00:00:00.000+00:00")));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_document_parse_typed() {
        let named: Named = sample().parse().unwrap();
        assert_eq!(named.id, "doc1");
        assert_eq!(named.name, "a.pdf");
    }

    #[test]
    fn test_document_list_parse() {
        let list = DocumentList {
            total: 1,
            documents: vec![sample()],
        };
        let typed: DocumentList<Named> = list.parse().unwrap();
        assert_eq!(typed.total, 1);
        assert_eq!(typed.documents[0].name, "a.pdf");
    }

    #[test]
    fn test_input_file_guesses_mime() {
        let file = InputFile::from_bytes(vec![0u8; 10], "report.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.len(), 10);

        let unknown = InputFile::from_bytes(Vec::new(), "blob");
        assert_eq!(unknown.mime_type, "application/octet-stream");
        assert!(unknown.is_empty());
    }
}
