//! Clients for the Google APIs the sync talks to.
//!
//! Each API is a trait so the sync steps can run against the HTTP client
//! or an in-memory double. `GoogleClient` implements all four.

pub mod docs;
pub mod drive;
pub mod gmail;
pub mod oauth;
pub mod sheets;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use docs::DocsRequest;
use drive::{DriveFile, FileMetadata, FileQuery};
use gmail::{Message, MessageListPage};
use sheets::{AppendValuesResponse, ValueRange};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub gmail: String,
    pub drive: String,
    pub sheets: String,
    pub docs: String,
    pub oauth_token: String,
    pub oauth_auth: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            gmail: "https://gmail.googleapis.com/gmail/v1".to_string(),
            drive: "https://www.googleapis.com/drive/v3".to_string(),
            sheets: "https://sheets.googleapis.com/v4".to_string(),
            docs: "https://docs.googleapis.com/v1".to_string(),
            oauth_token: "https://oauth2.googleapis.com/token".to_string(),
            oauth_auth: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Point every API at the same base URL. Used with a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            gmail: base.to_string(),
            drive: base.to_string(),
            sheets: base.to_string(),
            docs: base.to_string(),
            oauth_token: format!("{}/token", base),
            oauth_auth: format!("{}/auth", base),
        }
    }
}

#[async_trait]
pub trait MailService: Send + Sync {
    /// One page of message ids matching a Gmail search query.
    async fn list_messages(&self, query: &str, page_token: Option<&str>)
    -> Result<MessageListPage>;

    /// A message in `full` format.
    async fn get_message(&self, id: &str) -> Result<Message>;
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<DriveFile>>;

    async fn create_file(&self, metadata: &FileMetadata) -> Result<DriveFile>;
}

#[async_trait]
pub trait SheetsService: Send + Sync {
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange>;

    /// Append rows after the last row of the table found in `range`,
    /// inserting new rows rather than overwriting.
    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<AppendValuesResponse>;
}

#[async_trait]
pub trait DocsService: Send + Sync {
    async fn batch_update(&self, document_id: &str, requests: Vec<DocsRequest>) -> Result<()>;
}

/// The four authenticated service handles a sync needs.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub mail: &'a dyn MailService,
    pub storage: &'a dyn StorageService,
    pub sheets: &'a dyn SheetsService,
    pub docs: &'a dyn DocsService,
}

impl<'a> Services<'a> {
    pub fn from_client(client: &'a GoogleClient) -> Self {
        Self {
            mail: client,
            storage: client,
            sheets: client,
            docs: client,
        }
    }
}

/// HTTP client for the Gmail, Drive, Sheets and Docs REST APIs.
#[derive(Clone, Debug)]
pub struct GoogleClient {
    http: Client,
    access_token: String,
    endpoints: ApiEndpoints,
}

impl GoogleClient {
    pub fn new(access_token: &str, endpoints: ApiEndpoints) -> Self {
        Self {
            http: Client::new(),
            access_token: access_token.to_string(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Send an authenticated request and decode the JSON response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<T> {
        let res = request.bearer_auth(&self.access_token).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("{} failed: {} ({})", action, status, text);
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Unexpected {} response: {}", action, text))
    }
}
