//! Per-month spreadsheet lookup and row appends.

use anyhow::Result;

use super::fetch::MessageRecord;
use super::folders::{DuplicatePolicy, FolderMap, find_or_create};
use crate::core::Outcome;
use crate::google::drive::{FileQuery, SPREADSHEET_MIME_TYPE};
use crate::google::{SheetsService, StorageService};

pub const DEFAULT_RANGE: &str = "Sheet1!A1";
pub const HEADER_ROW: [&str; 4] = ["from", "to", "date", "link"];

/// Find or create the spreadsheet `title` in the record's month folder.
///
/// `NoSheetForPeriod` when the record's month has no folder in the map.
/// Remote errors are logged and returned as `Failed`.
pub async fn find_or_create_spreadsheet(
    storage: &dyn StorageService,
    sheet_folders: &FolderMap,
    record: &MessageRecord,
    title: &str,
    policy: DuplicatePolicy,
) -> Outcome<String> {
    let Some(folder_id) = sheet_folders.get(&record.sheet_folder_id_key) else {
        return Outcome::NoSheetForPeriod(format!(
            "No sheet data available for {}",
            record.sheet_folder_id_key
        ));
    };

    let query = FileQuery::new(title, SPREADSHEET_MIME_TYPE, Some(folder_id.as_str()));
    match find_or_create(storage, &query, policy).await {
        Ok(spreadsheet_id) => {
            tracing::debug!(
                "Using spreadsheet {:?} ({}) in folder {}",
                title,
                spreadsheet_id,
                folder_id
            );
            Outcome::Done(spreadsheet_id)
        }
        Err(err) => {
            tracing::error!("Error creating or fetching spreadsheet: {:#}", err);
            Outcome::Failed(err.to_string())
        }
    }
}

pub fn row_values(record: &MessageRecord, link: &str) -> Vec<String> {
    vec![
        record.from.clone(),
        record.to.clone(),
        record.date.clone(),
        link.to_string(),
    ]
}

/// Append the record's row, with the header row first when `range` has no
/// values yet. Returns the range the API reports as updated.
pub async fn write_row(
    sheets: &dyn SheetsService,
    spreadsheet_id: &str,
    record: &MessageRecord,
    link: &str,
    range: &str,
) -> Result<Option<String>> {
    let existing = sheets.get_values(spreadsheet_id, range).await?;

    let mut rows = Vec::with_capacity(2);
    if existing.is_empty() {
        rows.push(HEADER_ROW.iter().map(|h| h.to_string()).collect());
    }
    rows.push(row_values(record, link));

    let response = sheets.append_values(spreadsheet_id, range, rows).await?;
    let updated_range = response.updated_range();
    match &updated_range {
        Some(range) => tracing::debug!("Data appended to range: {}", range),
        None => tracing::debug!("No updatedRange returned in the response"),
    }
    Ok(updated_range)
}
