//! Date and header helpers shared by the fetch and write steps.

use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, TimeZone, Timelike};
use regex::Regex;

/// Format of the dates that bound a fetch window.
pub const WINDOW_DATE_FORMAT: &str = "%Y/%m/%d";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(.*?)>").expect("address pattern is valid"));

/// Today's date as `YYYY/MM/DD`.
pub fn current_date() -> String {
    Local::now().format(WINDOW_DATE_FORMAT).to_string()
}

/// Tomorrow's date as `YYYY/MM/DD`.
pub fn next_day_date() -> String {
    (Local::now() + Duration::days(1))
        .format(WINDOW_DATE_FORMAT)
        .to_string()
}

/// Epoch seconds of local midnight on a `YYYY/MM/DD` date.
///
/// When a DST change skips midnight, the first whole hour after the gap is
/// used instead.
pub fn date_to_epoch(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date, WINDOW_DATE_FORMAT)
        .with_context(|| format!("Invalid date {:?}, expected YYYY/MM/DD", date))?;
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    let local = (0..24)
        .find_map(|hour| {
            Local
                .from_local_datetime(&(midnight + Duration::hours(hour)))
                .earliest()
        })
        .ok_or_else(|| anyhow!("No local time exists on {}", date))?;
    Ok(local.timestamp())
}

/// Unpadded date and time components of a message `Date` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateComponents {
    pub day: String,
    pub month: String,
    pub year: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
}

impl DateComponents {
    /// Components used when the header can't be parsed. They still flow
    /// into the routing keys, e.g. `docs_day_D`.
    pub fn placeholder() -> Self {
        Self {
            day: "D".to_string(),
            month: "M".to_string(),
            year: "Y".to_string(),
            hour: "H".to_string(),
            minute: "M".to_string(),
            second: "S".to_string(),
        }
    }

    fn from_datetime(date: &DateTime<FixedOffset>) -> Self {
        Self {
            day: date.day().to_string(),
            month: date.month().to_string(),
            year: date.year().to_string(),
            hour: date.hour().to_string(),
            minute: date.minute().to_string(),
            second: date.second().to_string(),
        }
    }

    /// `D/M/Y; H:M:S`
    pub fn display_date(&self) -> String {
        format!(
            "{}/{}/{}; {}:{}:{}",
            self.day, self.month, self.year, self.hour, self.minute, self.second
        )
    }

    pub fn docs_folder_key(&self) -> String {
        format!("docs_day_{}", self.day)
    }

    pub fn sheet_folder_key(&self) -> String {
        format!("spreadsheet_{}_{}", self.month, self.year)
    }
}

/// Parse a header like `Tue, 14 Nov 2024 10:05:30 +0000`.
///
/// The weekday has to be a weekday abbreviation but isn't checked against
/// the date. Anything else that doesn't fit the format, including trailing
/// comments such as ` (UTC)`, gives `DateComponents::placeholder()`.
pub fn parse_date_components(value: &str) -> DateComponents {
    parse_header_date(value)
        .map(|date| DateComponents::from_datetime(&date))
        .unwrap_or_else(|| {
            tracing::warn!("Unparsable Date header {:?}, using placeholders", value);
            DateComponents::placeholder()
        })
}

fn parse_header_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let (weekday, rest) = value.trim().split_once(", ")?;
    if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) {
        return None;
    }
    DateTime::parse_from_str(rest.trim(), "%d %b %Y %H:%M:%S %z").ok()
}

/// Join the first `<address>` of each header value with `", "`.
///
/// Values without an angle-bracketed address are left out.
pub fn join_addresses(values: &[&str]) -> String {
    values
        .iter()
        .filter_map(|value| ADDRESS_RE.captures(value))
        .filter_map(|caps| caps.get(1))
        .map(|address| address.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name of the spreadsheet that collects rows for `month` (unpadded).
pub fn spreadsheet_file_name(month: u32) -> String {
    format!("Month_{}_Spreadsheet_Data", month)
}

/// Spreadsheet name for the month the run happens in.
pub fn current_spreadsheet_file_name() -> String {
    spreadsheet_file_name(Local::now().month())
}

pub fn document_title(date: &str) -> String {
    format!("Email_{}_full_message", date)
}
