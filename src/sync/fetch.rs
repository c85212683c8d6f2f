//! Fetch the messages of a date window and turn them into records.

use anyhow::Result;

use super::checkpoint::CheckpointStore;
use crate::core::Outcome;
use crate::core::dates::{date_to_epoch, join_addresses, parse_date_components};
use crate::google::MailService;
use crate::google::gmail::{Message, extract_text_body, header_value};

pub const EMAIL_LINK_BASE: &str = "https://mail.google.com/mail/u/0/#inbox/";

/// What gets written for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub from: String,
    pub to: String,
    pub date: String,
    pub subject: String,
    pub message: String,
    pub email_link: String,
    /// `docs_day_{day}`, day unpadded
    pub docs_folder_id_key: String,
    /// `spreadsheet_{month}_{year}`, month unpadded
    pub sheet_folder_id_key: String,
}

/// Build a record from a message in `full` format. `None` when no text
/// body was found.
pub fn extract_record(message: &Message) -> Option<MessageRecord> {
    let body = message.payload.as_ref().and_then(extract_text_body)?;

    let from = header_value(message, "From");
    let to = header_value(message, "To");
    let cc = header_value(message, "Cc");
    let bcc = header_value(message, "Bcc");
    let date = parse_date_components(&header_value(message, "Date"));

    Some(MessageRecord {
        from: join_addresses(&[&from]),
        to: join_addresses(&[&to, &cc, &bcc]),
        date: date.display_date(),
        subject: header_value(message, "Subject"),
        message: body,
        email_link: format!("{}{}", EMAIL_LINK_BASE, message.id),
        docs_folder_id_key: date.docs_folder_key(),
        sheet_folder_id_key: date.sheet_folder_key(),
    })
}

async fn list_message_ids(mail: &dyn MailService, query: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = mail.list_messages(query, page_token.as_deref()).await?;
        ids.extend(page.messages.unwrap_or_default().into_iter().map(|m| m.id));
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }
    Ok(ids)
}

/// Fetch every message received in `[start_date, end_date)`.
///
/// Dates are `YYYY/MM/DD` in local time. When the checkpoint already
/// reaches `end_date` nothing is fetched and `AlreadyProcessed` is
/// returned. The checkpoint moves to `end_date` only after every message
/// was fetched, and also when the window was empty.
pub async fn fetch_messages(
    mail: &dyn MailService,
    checkpoints: &dyn CheckpointStore,
    start_date: &str,
    end_date: &str,
) -> Result<Outcome<Vec<MessageRecord>>> {
    let start_epoch = date_to_epoch(start_date)?;
    let end_epoch = date_to_epoch(end_date)?;

    let mut checkpoint = checkpoints.load()?;
    if checkpoint.covers(end_epoch) {
        return Ok(Outcome::AlreadyProcessed(format!(
            "Data till {} already exists",
            end_date
        )));
    }

    let query = format!("after:{} before:{}", start_epoch, end_epoch);
    tracing::info!("Started fetching email data for {} to {}", start_date, end_date);
    let ids = list_message_ids(mail, &query).await?;
    tracing::info!(
        "Finished fetching email data for {} to {}: {} messages",
        start_date,
        end_date,
        ids.len()
    );

    tracing::info!("Starting to process fetched email data");
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        let message = mail.get_message(&id).await?;
        match extract_record(&message) {
            Some(record) => records.push(record),
            None => tracing::debug!("Dropping message {} without a text body", id),
        }
    }

    checkpoint.last_epoch = Some(end_epoch);
    checkpoints.save(&checkpoint)?;

    Ok(Outcome::Done(records))
}
