//! Google Sheets values API.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{GoogleClient, SheetsService};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueRange {
    pub range: Option<String>,
    pub values: Option<Vec<Vec<String>>>,
}

impl ValueRange {
    pub fn is_empty(&self) -> bool {
        self.values.as_ref().is_none_or(|rows| rows.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateValuesResponse {
    #[serde(rename = "updatedRange")]
    pub updated_range: Option<String>,
    #[serde(rename = "updatedRows")]
    pub updated_rows: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppendValuesResponse {
    pub updates: Option<UpdateValuesResponse>,
}

impl AppendValuesResponse {
    pub fn updated_range(&self) -> Option<String> {
        self.updates.as_ref()?.updated_range.clone()
    }
}

#[async_trait]
impl SheetsService for GoogleClient {
    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.endpoints().sheets,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        );
        self.send(self.http().get(&url), "Values get").await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<AppendValuesResponse> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.endpoints().sheets,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        );
        let body = json!({ "values": rows });
        self.send(self.http().post(&url).json(&body), "Values append")
            .await
    }
}
