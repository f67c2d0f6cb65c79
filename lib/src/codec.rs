//! JSON encoding of pad entries
//!
//! A pad document is a JSON array of objects with the fields `URL`, `Name`,
//! `Description`, `DateAdded`, `pageSnapshot` and `Tags`. Field names and the
//! date layout are a compatibility contract with existing pad files.
//!
//! Every record decodes on its own: a record with a missing or malformed field
//! is rejected as a whole and never defaulted. Whether that rejection stops the
//! load is the caller's [`DecodePolicy`].

use crate::error::{Result, UrlPadError};
use crate::models::entry::Entry;
use crate::tags::TagSet;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `dd MMMM yy , HH:mm:ss` with English month names
pub const DATE_FORMAT: &str = "%d %B %y , %H:%M:%S";

/// How a document load reacts to a record that fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Log the bad record, keep loading the rest
    #[default]
    Skip,
    /// Fail the whole load on the first bad record
    Abort,
}

/// On-disk shape of one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "DateAdded")]
    pub date_added: String,
    #[serde(rename = "pageSnapshot")]
    pub page_snapshot: String,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
}

impl From<&Entry> for StoredEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            url: entry.url.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            date_added: format_date(&entry.date_added),
            page_snapshot: entry.snapshot_path().to_string(),
            tags: entry.tags.iter().map(str::to_string).collect(),
        }
    }
}

impl StoredEntry {
    /// Rebuild the entry; `index` is the record's position, used in errors
    pub fn into_entry(self, index: usize) -> Result<Entry> {
        let date_added = parse_date(&self.date_added).map_err(|e| UrlPadError::Decode {
            index,
            reason: format!("DateAdded '{}': {}", self.date_added, e),
        })?;

        Ok(Entry::restored(
            self.url,
            self.name,
            self.description,
            date_added,
            &self.page_snapshot,
            TagSet::from(self.tags),
        ))
    }
}

/// Records that decoded, plus the per-record failures that were skipped
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub entries: Vec<Entry>,
    pub failures: Vec<UrlPadError>,
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(text: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
}

pub fn encode(entries: &[Entry]) -> Vec<StoredEntry> {
    entries.iter().map(StoredEntry::from).collect()
}

/// Pretty-printed pad document
pub fn to_json(entries: &[Entry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&encode(entries))?)
}

/// Decode a single record from its JSON value
pub fn decode_entry(value: serde_json::Value, index: usize) -> Result<Entry> {
    let stored: StoredEntry = serde_json::from_value(value).map_err(|e| UrlPadError::Decode {
        index,
        reason: e.to_string(),
    })?;
    stored.into_entry(index)
}

/// Decode a whole pad document
pub fn decode_document(json: &str, policy: DecodePolicy) -> Result<DecodeReport> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| UrlPadError::Decode {
            index: 0,
            reason: format!("document is not a JSON array of entries: {}", e),
        })?;

    let mut report = DecodeReport::default();
    for (index, value) in values.into_iter().enumerate() {
        match decode_entry(value, index) {
            Ok(entry) => report.entries.push(entry),
            Err(e) => match policy {
                DecodePolicy::Abort => return Err(e),
                DecodePolicy::Skip => {
                    log::warn!("Skipping stored entry: {}", e);
                    report.failures.push(e);
                }
            },
        }
    }

    log::debug!(
        "Decoded {} entries ({} skipped)",
        report.entries.len(),
        report.failures.len()
    );
    Ok(report)
}
