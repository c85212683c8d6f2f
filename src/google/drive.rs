//! Google Drive files API: name lookups and creating folders, documents
//! and spreadsheets.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GoogleClient, StorageService};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// Metadata sent when creating a file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl FileMetadata {
    pub fn new(name: &str, mime_type: &str, parent: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        }
    }

    pub fn folder(name: &str, parent: Option<&str>) -> Self {
        Self::new(name, FOLDER_MIME_TYPE, parent)
    }
}

/// Exact-name lookup, optionally restricted to one parent folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub name: String,
    pub mime_type: String,
    pub parent: Option<String>,
}

impl FileQuery {
    pub fn new(name: &str, mime_type: &str, parent: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parent: parent.map(str::to_string),
        }
    }

    pub fn folder(name: &str, parent: Option<&str>) -> Self {
        Self::new(name, FOLDER_MIME_TYPE, parent)
    }

    /// The metadata for creating the file this query looks for.
    pub fn to_metadata(&self) -> FileMetadata {
        FileMetadata::new(&self.name, &self.mime_type, self.parent.as_deref())
    }

    /// Render as a Drive `q` search expression. Trashed files never match.
    pub fn to_query_string(&self) -> String {
        let mut query = format!(
            "mimeType='{}' and name='{}'",
            escape_query_value(&self.mime_type),
            escape_query_value(&self.name)
        );
        if let Some(parent) = &self.parent {
            query.push_str(&format!(" and '{}' in parents", escape_query_value(parent)));
        }
        query.push_str(" and trashed = false");
        query
    }
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl StorageService for GoogleClient {
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<DriveFile>> {
        let q = query.to_query_string();
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = format!(
                "{}/files?q={}&spaces=drive&fields={}",
                self.endpoints().drive,
                urlencoding::encode(&q),
                urlencoding::encode("nextPageToken,files(id,name)")
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }
            let page: FileList = self.send(self.http().get(&url), "File list").await?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(files)
    }

    async fn create_file(&self, metadata: &FileMetadata) -> Result<DriveFile> {
        let url = format!("{}/files?fields=id,name", self.endpoints().drive);
        self.send(self.http().post(&url).json(metadata), "File create")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let query = FileQuery::folder("Email_data@Bdlaz", None);
        assert_eq!(
            query.to_query_string(),
            "mimeType='application/vnd.google-apps.folder' and name='Email_data@Bdlaz' and trashed = false"
        );

        let query = FileQuery::folder("11_2024", Some("year-folder"));
        assert_eq!(
            query.to_query_string(),
            "mimeType='application/vnd.google-apps.folder' and name='11_2024' and 'year-folder' in parents and trashed = false"
        );

        let query = FileQuery::new("Bob's \\ sheet", SPREADSHEET_MIME_TYPE, Some("p"));
        assert_eq!(
            query.to_query_string(),
            "mimeType='application/vnd.google-apps.spreadsheet' and name='Bob\\'s \\\\ sheet' and 'p' in parents and trashed = false"
        );
    }

    #[test]
    fn test_metadata_json() {
        let root = serde_json::to_value(FileMetadata::folder("root", None)).unwrap();
        assert_eq!(
            root,
            serde_json::json!({"name": "root", "mimeType": FOLDER_MIME_TYPE})
        );

        let doc = FileQuery::new("Email", DOCUMENT_MIME_TYPE, Some("day")).to_metadata();
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            serde_json::json!({"name": "Email", "mimeType": DOCUMENT_MIME_TYPE, "parents": ["day"]})
        );
    }
}
