//! Google Docs batch updates.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{DocsService, GoogleClient};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DocsRequest {
    InsertText { location: Location, text: String },
}

impl DocsRequest {
    pub fn insert_text(index: u64, text: &str) -> Self {
        DocsRequest::InsertText {
            location: Location { index },
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl DocsService for GoogleClient {
    async fn batch_update(&self, document_id: &str, requests: Vec<DocsRequest>) -> Result<()> {
        let url = format!(
            "{}/documents/{}:batchUpdate",
            self.endpoints().docs,
            urlencoding::encode(document_id)
        );
        let body = json!({ "requests": requests });
        let _: serde_json::Value = self
            .send(self.http().post(&url).json(&body), "Document update")
            .await?;
        Ok(())
    }
}
