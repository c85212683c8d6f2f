//! Find-or-create of the `root/year/month/...` folder tree in Drive.
//!
//! Lookups are by exact name under a parent and creation happens only
//! when nothing matches. Listing and creating are separate calls, so two
//! runs racing each other can still create the same folder twice.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, NaiveDate};

use crate::google::StorageService;
use crate::google::drive::FileQuery;

/// Routing key to Drive folder id.
pub type FolderMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    Docs,
    Spreadsheet,
}

impl fmt::Display for FolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderKind::Docs => write!(f, "docs"),
            FolderKind::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// What to do when a lookup finds more than one file with the name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Use the first match the API returns and log the others.
    #[default]
    UseFirst,
    /// Fail the lookup.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "use-first" | "use_first" | "first" => Ok(DuplicatePolicy::UseFirst),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(anyhow!(
                "Unknown duplicate policy {:?}, expected \"use-first\" or \"reject\"",
                other
            )),
        }
    }
}

/// Id of the file matching `query`, creating it when there is none.
pub async fn find_or_create(
    storage: &dyn StorageService,
    query: &FileQuery,
    policy: DuplicatePolicy,
) -> Result<String> {
    let existing = storage.list_files(query).await?;

    if let Some(first) = existing.first() {
        if existing.len() > 1 {
            let ids = existing.iter().map(|f| f.id.as_str()).collect::<Vec<_>>();
            match policy {
                DuplicatePolicy::UseFirst => tracing::warn!(
                    "Found {} files named {:?}, using {}: {:?}",
                    existing.len(),
                    query.name,
                    first.id,
                    ids
                ),
                DuplicatePolicy::Reject => bail!(
                    "Found {} files named {:?} where one was expected: {:?}",
                    existing.len(),
                    query.name,
                    ids
                ),
            }
        }
        return Ok(first.id.clone());
    }

    let created = storage.create_file(&query.to_metadata()).await?;
    tracing::debug!("Created {:?} with id {}", query.name, created.id);
    Ok(created.id)
}

pub async fn find_or_create_folder(
    storage: &dyn StorageService,
    name: &str,
    parent: Option<&str>,
    policy: DuplicatePolicy,
) -> Result<String> {
    find_or_create(storage, &FileQuery::folder(name, parent), policy).await
}

fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(anyhow!("Invalid month {}/{}", month, year))?;
    let last = first_of_next
        .pred_opt()
        .ok_or(anyhow!("Invalid month {}/{}", month, year))?;
    Ok(last.day())
}

/// Build or find the folder tree for one year and return its routing map.
///
/// `root/{YYYY}/{MM}_{YYYY}/` for each month, then
/// - docs: `docs/{DD}_{MM}_{YYYY}` per day, keyed `docs_day_{day}` with the
///   day unpadded. The same key exists in every month, so later months
///   overwrite earlier ones and the map ends up holding December's days.
/// - spreadsheet: `spreadsheet`, keyed `spreadsheet_{MM}_{YYYY}` with the
///   month padded.
///
/// Remote errors are returned as-is.
pub async fn resolve_folders(
    storage: &dyn StorageService,
    root_name: &str,
    kind: FolderKind,
    year: i32,
    policy: DuplicatePolicy,
) -> Result<FolderMap> {
    tracing::info!("Resolving {} folders under {}/{}", kind, root_name, year);
    let mut folders = FolderMap::new();

    let root_id = find_or_create_folder(storage, root_name, None, policy).await?;
    let year_id =
        find_or_create_folder(storage, &year.to_string(), Some(root_id.as_str()), policy).await?;

    for month in 1..=12u32 {
        let month_name = format!("{:02}_{}", month, year);
        let month_id =
            find_or_create_folder(storage, &month_name, Some(year_id.as_str()), policy).await?;

        match kind {
            FolderKind::Docs => {
                let docs_id =
                    find_or_create_folder(storage, "docs", Some(month_id.as_str()), policy).await?;
                for day in 1..=days_in_month(year, month)? {
                    let day_name = format!("{:02}_{}", day, month_name);
                    let day_id =
                        find_or_create_folder(storage, &day_name, Some(docs_id.as_str()), policy)
                            .await?;
                    folders.insert(format!("docs_day_{}", day), day_id);
                }
            }
            FolderKind::Spreadsheet => {
                let sheet_id =
                    find_or_create_folder(storage, "spreadsheet", Some(month_id.as_str()), policy)
                        .await?;
                folders.insert(format!("spreadsheet_{}", month_name), sheet_id);
            }
        }
    }

    tracing::info!("Resolved {} {} folders", folders.len(), kind);
    Ok(folders)
}
