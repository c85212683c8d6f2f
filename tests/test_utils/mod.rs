//! In-memory stand-ins for the Google APIs used by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use mailfiler::google::docs::DocsRequest;
use mailfiler::google::drive::{DriveFile, FileMetadata, FileQuery};
use mailfiler::google::gmail::{Message, MessageListPage, MessageResponse};
use mailfiler::google::sheets::{AppendValuesResponse, UpdateValuesResponse, ValueRange};
use mailfiler::google::{DocsService, MailService, Services, SheetsService, StorageService};

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
    pub trashed: bool,
}

#[derive(Default)]
struct State {
    messages: Vec<Message>,
    page_size: Option<usize>,
    queries: Vec<String>,
    mail_calls: usize,
    files: Vec<StoredFile>,
    creates: usize,
    lists: usize,
    fail_create_mime: Option<String>,
    rows: HashMap<String, Vec<Vec<String>>>,
    fail_append: bool,
    doc_updates: HashMap<String, Vec<DocsRequest>>,
    fail_docs: bool,
    fail_gets: bool,
}

/// Gmail, Drive, Sheets and Docs backed by one in-memory state.
#[derive(Default)]
pub struct FakeGoogle {
    state: Mutex<State>,
}

impl FakeGoogle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().messages = messages;
        fake
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            mail: self,
            storage: self,
            sheets: self,
            docs: self,
        }
    }

    pub fn set_page_size(&self, size: usize) {
        self.state.lock().unwrap().page_size = Some(size);
    }

    pub fn push_message(&self, message: Message) {
        self.state.lock().unwrap().messages.push(message);
    }

    pub fn clear_messages(&self) {
        self.state.lock().unwrap().messages.clear();
    }

    pub fn mail_calls(&self) -> usize {
        self.state.lock().unwrap().mail_calls
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn lists(&self) -> usize {
        self.state.lock().unwrap().lists
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn files_with_mime(&self, mime_type: &str) -> Vec<StoredFile> {
        self.files()
            .into_iter()
            .filter(|f| f.mime_type == mime_type)
            .collect()
    }

    /// Add a file directly, bypassing the create counter.
    pub fn insert_file(&self, name: &str, mime_type: &str, parent: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("file-{}", state.files.len() + 1);
        state.files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
            trashed: false,
        });
        id
    }

    /// Move a file to the trash. It stays in `files()` but no longer lists.
    pub fn trash_file(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(file) = state.files.iter_mut().find(|f| f.id == id) {
            file.trashed = true;
        }
    }

    pub fn fail_creating(&self, mime_type: &str) {
        self.state.lock().unwrap().fail_create_mime = Some(mime_type.to_string());
    }

    pub fn fail_appends(&self) {
        self.state.lock().unwrap().fail_append = true;
    }

    pub fn fail_gets(&self) {
        self.state.lock().unwrap().fail_gets = true;
    }

    pub fn fail_docs(&self) {
        self.state.lock().unwrap().fail_docs = true;
    }

    pub fn rows(&self, spreadsheet_id: &str) -> Vec<Vec<String>> {
        self.state
            .lock()
            .unwrap()
            .rows
            .get(spreadsheet_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn doc_updates(&self, document_id: &str) -> Vec<DocsRequest> {
        self.state
            .lock()
            .unwrap()
            .doc_updates
            .get(document_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailService for FakeGoogle {
    async fn list_messages(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<MessageListPage> {
        let mut state = self.state.lock().unwrap();
        state.mail_calls += 1;
        state.queries.push(query.to_string());

        let ids: Vec<MessageResponse> = state
            .messages
            .iter()
            .map(|m| MessageResponse {
                id: m.id.clone(),
                thread_id: m.thread_id.clone(),
            })
            .collect();
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let size = state.page_size.unwrap_or(ids.len().max(1));
        let end = (start + size).min(ids.len());
        let page = ids[start..end].to_vec();

        Ok(MessageListPage {
            messages: if page.is_empty() { None } else { Some(page) },
            next_page_token: (end < ids.len()).then(|| end.to_string()),
        })
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        let mut state = self.state.lock().unwrap();
        state.mail_calls += 1;
        if state.fail_gets {
            bail!("Message fetch failed: 500 Internal Server Error");
        }
        state
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(anyhow!("404 message {}", id))
    }
}

#[async_trait]
impl StorageService for FakeGoogle {
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<DriveFile>> {
        let mut state = self.state.lock().unwrap();
        state.lists += 1;
        Ok(state
            .files
            .iter()
            .filter(|f| !f.trashed)
            .filter(|f| f.name == query.name && f.mime_type == query.mime_type)
            .filter(|f| match &query.parent {
                Some(parent) => f.parents.contains(parent),
                None => true,
            })
            .map(|f| DriveFile {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect())
    }

    async fn create_file(&self, metadata: &FileMetadata) -> Result<DriveFile> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_mime.as_deref() == Some(metadata.mime_type.as_str()) {
            bail!("File create failed: 500 Internal Server Error");
        }
        state.creates += 1;
        let id = format!("file-{}", state.files.len() + 1);
        state.files.push(StoredFile {
            id: id.clone(),
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
            parents: metadata.parents.clone(),
            trashed: false,
        });
        Ok(DriveFile {
            id,
            name: metadata.name.clone(),
        })
    }
}

#[async_trait]
impl SheetsService for FakeGoogle {
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let state = self.state.lock().unwrap();
        let values = state.rows.get(spreadsheet_id).filter(|rows| !rows.is_empty());
        Ok(ValueRange {
            range: Some(range.to_string()),
            values: values.cloned(),
        })
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        _range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<AppendValuesResponse> {
        let mut state = self.state.lock().unwrap();
        if state.fail_append {
            bail!("Values append failed: 403 Forbidden");
        }
        let sheet = state.rows.entry(spreadsheet_id.to_string()).or_default();
        let first = sheet.len() + 1;
        let count = rows.len();
        sheet.extend(rows);
        Ok(AppendValuesResponse {
            updates: Some(UpdateValuesResponse {
                updated_range: Some(format!("Sheet1!A{}:D{}", first, first + count - 1)),
                updated_rows: Some(count as u64),
            }),
        })
    }
}

#[async_trait]
impl DocsService for FakeGoogle {
    async fn batch_update(&self, document_id: &str, requests: Vec<DocsRequest>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_docs {
            bail!("Document update failed: 500 Internal Server Error");
        }
        state
            .doc_updates
            .entry(document_id.to_string())
            .or_default()
            .extend(requests);
        Ok(())
    }
}

/// A message in Gmail's `full` format with the given headers and payload.
pub fn gmail_message(id: &str, headers: &[(&str, &str)], payload: serde_json::Value) -> Message {
    let mut payload = payload;
    payload["headers"] = serde_json::Value::Array(
        headers
            .iter()
            .map(|(name, value)| serde_json::json!({"name": name, "value": value}))
            .collect(),
    );
    serde_json::from_value(serde_json::json!({
        "id": id,
        "threadId": format!("thr-{}", id),
        "payload": payload,
    }))
    .unwrap()
}

pub fn encode(text: &str) -> String {
    URL_SAFE.encode(text)
}

/// multipart/alternative with a single text/plain part.
pub fn plain_payload(body: &str) -> serde_json::Value {
    serde_json::json!({
        "mimeType": "multipart/alternative",
        "parts": [
            {"partId": "0", "mimeType": "text/plain", "body": {"size": body.len(), "data": encode(body)}}
        ]
    })
}

/// The "Hello" / "Hi there" message used across the scenario tests.
pub fn hello_message(id: &str, date: &str) -> Message {
    gmail_message(
        id,
        &[
            ("From", "Alice <alice@example.com>"),
            ("To", "Bob <bob@example.org>"),
            ("Cc", "Carol <carol@example.net>"),
            ("Date", date),
            ("Subject", "Hello"),
        ],
        plain_payload("Hi there"),
    )
}
