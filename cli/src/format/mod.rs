use crate::output::colorize::{Colorize, ColorizeEntry, PlainEntry};
use std::path::Path;
use urlpad::codec::StoredEntry;
use urlpad::error::Result;
use urlpad::models::Entry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Colored,
    Plain,
    Json,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Colored => "colored",
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        }
    }

    /// Render `(position, entry)` pairs; JSON uses the stored record layout
    pub fn render(self, records: &[(usize, &Entry)], pad_folder: &Path) -> Result<String> {
        match self {
            OutputFormat::Json => {
                let stored: Vec<StoredEntry> =
                    records.iter().map(|(_, e)| StoredEntry::from(*e)).collect();
                Ok(serde_json::to_string_pretty(&stored)?)
            }
            OutputFormat::Plain => Ok(records
                .iter()
                .map(|(i, e)| PlainEntry::new(*i, e, pad_folder).to_colored())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Colored => Ok(records
                .iter()
                .map(|(i, e)| ColorizeEntry::new(*i, e, pad_folder).to_colored())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}
