//! Gmail API client for listing messages in a window and reading them in
//! `full` format, plus helpers for pulling headers and a text body out of
//! the MIME part tree the API returns.

use anyhow::Result;
use async_trait::async_trait;
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserialize, Serialize};

use super::{GoogleClient, MailService};

/// Gmail bodies are base64url and may or may not carry padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Message and part structures from the Gmail API documentation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct MessageListPage {
    pub messages: Option<Vec<MessageResponse>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
    #[serde(rename = "internalDate")]
    pub internal_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePartBody {
    #[serde(rename = "attachmentId")]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    // Base64url encoded
    pub data: Option<String>,
}

/// A node of the MIME tree. The message payload is the root part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "partId")]
    pub part_id: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mimetype: String,
    pub headers: Option<Vec<MessageHeader>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

/// Value of the first header named exactly `name`, or an empty string.
pub fn header_value(message: &Message, name: &str) -> String {
    message
        .payload
        .as_ref()
        .and_then(|payload| payload.headers.as_ref())
        .and_then(|headers| headers.iter().find(|h| h.name == name))
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

fn decode_base64(data: &str) -> Option<String> {
    let decoded = URL_SAFE_LENIENT
        .decode(data)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());
    if decoded.is_none() {
        tracing::error!("Base64 decode failed for: {}", data);
    }
    decoded
}

fn is_text(part: &MessagePart) -> bool {
    part.mimetype == "text/plain" || part.mimetype == "text/html"
}

fn decode_text_part(part: &MessagePart) -> Option<String> {
    if !is_text(part) {
        return None;
    }
    let data = part.body.as_ref()?.data.as_deref()?;
    decode_base64(data).filter(|text| !text.is_empty())
}

/// Extract the raw text body from a message payload.
///
/// Depth-first, in part order: the payload itself, then each top-level
/// part, and for a part that isn't text its direct sub-parts. The first
/// `text/plain` or `text/html` part with data wins, so plain text only
/// beats HTML when it comes first. HTML is returned as-is.
pub fn extract_text_body(payload: &MessagePart) -> Option<String> {
    if let Some(text) = decode_text_part(payload) {
        return Some(text);
    }

    for part in payload.parts.iter().flatten() {
        if is_text(part) {
            if let Some(text) = decode_text_part(part) {
                return Some(text);
            }
            continue;
        }

        // One level of nesting, e.g. multipart/alternative inside multipart/mixed
        if let Some(text) = part.parts.iter().flatten().find_map(decode_text_part) {
            return Some(text);
        }
    }

    None
}

#[async_trait]
impl MailService for GoogleClient {
    async fn list_messages(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<MessageListPage> {
        let mut url = format!(
            "{}/users/me/messages?q={}",
            self.endpoints().gmail,
            urlencoding::encode(query)
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        self.send(self.http().get(&url), "Message list").await
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        let url = format!(
            "{}/users/me/messages/{}?format=full",
            self.endpoints().gmail,
            urlencoding::encode(id)
        );
        self.send(self.http().get(&url), "Message fetch").await
    }
}
