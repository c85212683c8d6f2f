use anyhow::Result;

use crate::core::AppConfig;
use crate::core::dates::{current_date, next_day_date};
use crate::google::Services;
use crate::google::oauth::authenticated_client;
use crate::sync::checkpoint::FileCheckpointStore;
use crate::sync::{DEFAULT_END_DATE, DEFAULT_START_DATE, SyncOptions, run_sync};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub start: String,
    pub end: String,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_DATE.to_string(),
            end: DEFAULT_END_DATE.to_string(),
        }
    }
}

impl Window {
    pub fn from_args(start: Option<String>, end: Option<String>, today: bool) -> Self {
        if today {
            return Self {
                start: current_date(),
                end: next_day_date(),
            };
        }
        let defaults = Self::default();
        Self {
            start: start.unwrap_or(defaults.start),
            end: end.unwrap_or(defaults.end),
        }
    }
}

pub async fn run(config: &AppConfig, window: Window, root: Option<String>) -> Result<()> {
    let client = authenticated_client(config).await?;
    let services = Services::from_client(&client);
    let checkpoints = FileCheckpointStore::new(&config.checkpoint_path);

    let root = root.unwrap_or_else(|| config.root_folder.clone());
    let options = SyncOptions::new(&window.start, &window.end, &root, config.duplicate_policy);

    let report = run_sync(services, &checkpoints, &options).await?;
    println!(
        "Synced {} to {}: {} fetched, {} written, {} skipped, {} failed",
        window.start,
        window.end,
        report.fetched,
        report.written,
        report.skipped_no_sheet,
        report.failed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_args() {
        assert_eq!(Window::from_args(None, None, false), Window::default());
        assert_eq!(
            Window::from_args(Some("2024/12/01".to_string()), None, false),
            Window {
                start: "2024/12/01".to_string(),
                end: DEFAULT_END_DATE.to_string(),
            }
        );
        let today = Window::from_args(None, None, true);
        assert_eq!(today.start, current_date());
        assert_eq!(today.end, next_day_date());
    }
}
