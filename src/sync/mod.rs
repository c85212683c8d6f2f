//! Email to Drive sync: fetch a window of messages, resolve the folder
//! trees, then write a document and a spreadsheet row per message.

pub mod checkpoint;
pub mod document;
pub mod fetch;
pub mod folders;
pub mod spreadsheet;

use anyhow::{Result, bail};
use chrono::{Datelike, Local};

use crate::core::Outcome;
use crate::core::dates::{current_spreadsheet_file_name, document_title};
use crate::google::Services;
use checkpoint::CheckpointStore;
use document::{SheetTarget, write_document};
use fetch::fetch_messages;
use folders::{DuplicatePolicy, FolderKind, resolve_folders};

pub const DEFAULT_START_DATE: &str = "2024/11/14";
pub const DEFAULT_END_DATE: &str = "2024/11/22";
pub const DEFAULT_ROOT_FOLDER: &str = "Email_data@Bdlaz";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub start_date: String,
    pub end_date: String,
    pub root_folder: String,
    /// Year of the folder tree to resolve
    pub year: i32,
    pub sheet: SheetTarget,
}

impl SyncOptions {
    /// Options for a run happening now: this year's folders and this
    /// month's spreadsheet.
    pub fn new(start_date: &str, end_date: &str, root_folder: &str, policy: DuplicatePolicy) -> Self {
        Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            root_folder: root_folder.to_string(),
            year: Local::now().year(),
            sheet: SheetTarget {
                title: current_spreadsheet_file_name(),
                range: spreadsheet::DEFAULT_RANGE.to_string(),
                policy,
            },
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub written: usize,
    pub skipped_no_sheet: usize,
    pub failed: usize,
}

/// Run one sync.
///
/// A window the checkpoint already covers is returned as an error so the
/// process exits non-zero. Per-message failures are counted in the report
/// and don't stop the loop; an `Err` from a write does.
pub async fn run_sync(
    services: Services<'_>,
    checkpoints: &dyn CheckpointStore,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let records = match fetch_messages(
        services.mail,
        checkpoints,
        &options.start_date,
        &options.end_date,
    )
    .await?
    {
        Outcome::Done(records) => records,
        other => {
            tracing::info!("Data already present");
            bail!("{}", other);
        }
    };
    tracing::info!("Finished processing fetched email data");

    let policy = options.sheet.policy;
    let sheet_folders = resolve_folders(
        services.storage,
        &options.root_folder,
        FolderKind::Spreadsheet,
        options.year,
        policy,
    )
    .await?;
    let doc_folders = resolve_folders(
        services.storage,
        &options.root_folder,
        FolderKind::Docs,
        options.year,
        policy,
    )
    .await?;

    tracing::info!("Started writing data to docs and spreadsheet");
    let mut report = SyncReport {
        fetched: records.len(),
        ..Default::default()
    };
    for record in &records {
        let title = document_title(&record.date);
        let outcome = write_document(
            services,
            &doc_folders,
            &sheet_folders,
            &title,
            record,
            &options.sheet,
        )
        .await?;

        match outcome {
            Outcome::Done(doc) => {
                report.written += 1;
                tracing::debug!("Wrote {} for {}", doc.link, record.email_link);
            }
            Outcome::NoSheetForPeriod(info) | Outcome::AlreadyProcessed(info) => {
                report.skipped_no_sheet += 1;
                tracing::info!("Skipping {}: {}", record.email_link, info);
            }
            Outcome::Failed(reason) => {
                report.failed += 1;
                tracing::warn!("Failed to write {}: {}", record.email_link, reason);
            }
        }
    }
    tracing::info!(
        "Finished writing data to docs and spreadsheet: {} fetched, {} written, {} skipped, {} failed",
        report.fetched,
        report.written,
        report.skipped_no_sheet,
        report.failed
    );

    Ok(report)
}
