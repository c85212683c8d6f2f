//! One document per message, plus its spreadsheet row.

use anyhow::{Result, anyhow};

use super::fetch::MessageRecord;
use super::folders::{DuplicatePolicy, FolderMap};
use super::spreadsheet::{find_or_create_spreadsheet, write_row};
use crate::core::Outcome;
use crate::google::Services;
use crate::google::docs::DocsRequest;
use crate::google::drive::{DOCUMENT_MIME_TYPE, FileMetadata};

pub const DOCUMENT_LINK_BASE: &str = "https://docs.google.com/document/d/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub document_id: String,
    pub link: String,
    /// Range of the spreadsheet row, `None` when the append failed or
    /// the API didn't report one.
    pub updated_range: Option<String>,
}

/// Where rows go for this run.
#[derive(Debug, Clone)]
pub struct SheetTarget {
    pub title: String,
    pub range: String,
    pub policy: DuplicatePolicy,
}

pub fn document_link(document_id: &str) -> String {
    format!("{}{}/edit", DOCUMENT_LINK_BASE, document_id)
}

pub fn format_document_text(record: &MessageRecord) -> String {
    format!(
        "\nFrom: {}\nTo: {}\nDate: {}\nSubject: {}\n\nMessage:\n{}\n",
        record.from, record.to, record.date, record.subject, record.message
    )
}

/// Create the message's document in its day folder, append its row to the
/// month spreadsheet and fill in the document text.
///
/// A missing day folder is an `Err` and stops the run. Everything else is
/// reported through the `Outcome`:
/// - `NoSheetForPeriod`/`Failed` from the spreadsheet lookup come back
///   unchanged and leave the new document empty.
/// - A failed row append is only logged; the text is still inserted.
/// - Document create or update errors are logged and come back as `Failed`.
pub async fn write_document(
    services: Services<'_>,
    doc_folders: &FolderMap,
    sheet_folders: &FolderMap,
    title: &str,
    record: &MessageRecord,
    target: &SheetTarget,
) -> Result<Outcome<WrittenDocument>> {
    let folder_id = doc_folders.get(&record.docs_folder_id_key).ok_or(anyhow!(
        "No docs folder for {} ({})",
        record.docs_folder_id_key,
        record.email_link
    ))?;

    let metadata = FileMetadata::new(title, DOCUMENT_MIME_TYPE, Some(folder_id.as_str()));
    let document_id = match services.storage.create_file(&metadata).await {
        Ok(file) => file.id,
        Err(err) => {
            tracing::error!("An error occurred creating document {:?}: {:#}", title, err);
            return Ok(Outcome::Failed(err.to_string()));
        }
    };

    let spreadsheet = find_or_create_spreadsheet(
        services.storage,
        sheet_folders,
        record,
        &target.title,
        target.policy,
    )
    .await;
    let spreadsheet_id = match spreadsheet.into_done() {
        Ok(id) => id,
        Err(outcome) => return Ok(outcome),
    };

    let link = document_link(&document_id);
    let updated_range =
        match write_row(services.sheets, &spreadsheet_id, record, &link, &target.range).await {
            Ok(range) => range,
            Err(err) => {
                tracing::error!("An error occurred writing the spreadsheet row: {:#}", err);
                None
            }
        };

    let requests = vec![DocsRequest::insert_text(1, &format_document_text(record))];
    if let Err(err) = services.docs.batch_update(&document_id, requests).await {
        tracing::error!("An error occurred writing document {}: {:#}", document_id, err);
        return Ok(Outcome::Failed(err.to_string()));
    }

    Ok(Outcome::Done(WrittenDocument {
        document_id,
        link,
        updated_range,
    }))
}
