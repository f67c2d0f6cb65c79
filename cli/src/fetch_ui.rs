use crate::output::colorize::{Colorize, ColorizeEntry, PlainEntry};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use urlpad::error::UrlPadError;
use urlpad::models::{Entry, SnapshotState};
use urlpad::session::{EntrySink, PadSession};

/// What happened while the pipeline ran
#[derive(Debug, Default)]
pub struct Summary {
    pub added: usize,
    pub dropped: usize,
    pub snapshots_failed: usize,
    pub skipped_records: usize,
}

/// Create the spinner shown while waiting on the pipeline
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prints pipeline results above the spinner
pub struct ConsoleSink {
    progress: ProgressBar,
    pad_folder: PathBuf,
    /// Entries already in the pad before this sink saw any
    offset: usize,
    no_color: bool,
    summary: Rc<RefCell<Summary>>,
}

impl ConsoleSink {
    pub fn new(
        progress: ProgressBar,
        pad_folder: PathBuf,
        offset: usize,
        no_color: bool,
        summary: Rc<RefCell<Summary>>,
    ) -> Self {
        Self {
            progress,
            pad_folder,
            offset,
            no_color,
            summary,
        }
    }

    fn print(&self, line: String) {
        self.progress.suspend(|| println!("{}", line));
    }
}

impl EntrySink for ConsoleSink {
    fn notify_new_entry(&mut self, entry: &Entry) {
        self.summary.borrow_mut().added += 1;
        let index = self.offset + self.summary.borrow().added;
        let line = if self.no_color {
            PlainEntry::new(index, entry, &self.pad_folder).to_colored()
        } else {
            ColorizeEntry::new(index, entry, &self.pad_folder).to_colored()
        };
        self.print(line);
    }

    fn notify_fetch_failed(&mut self, url: &str, error: &UrlPadError) {
        self.summary.borrow_mut().dropped += 1;
        log::debug!("Fetch of {} failed: {}", url, error);
        self.print(format!(
            "✗ {} ({})",
            truncate_url(url, 60),
            categorize_error(error)
        ));
    }

    fn notify_snapshot_changed(&mut self, entry: &Entry) {
        if let SnapshotState::Failed(reason) = &entry.snapshot {
            self.summary.borrow_mut().snapshots_failed += 1;
            log::debug!("Snapshot of {} failed: {}", entry.url, reason);
        }
        self.progress
            .set_message(format!("Snapshot ready: {}", truncate_url(&entry.url, 50)));
    }

    fn notify_decode_failed(&mut self, error: &UrlPadError) {
        self.summary.borrow_mut().skipped_records += 1;
        self.print(format!("Skipped stored record: {}", error));
    }
}

/// Pump the session until it is idle, ticking the spinner; false if `limit` ran out
pub fn wait_with_spinner(session: &mut PadSession, spinner: &ProgressBar, limit: Duration) -> bool {
    let started = Instant::now();
    loop {
        session.pump();
        if session.is_idle() {
            return true;
        }
        if started.elapsed() >= limit {
            return false;
        }
        spinner.set_message(format!("Waiting on {} entries", session.in_flight()));
        thread::sleep(Duration::from_millis(50));
    }
}

/// Truncate URL to specified length with ellipsis
pub fn truncate_url(url: &str, max_len: usize) -> String {
    if url.chars().count() > max_len {
        let keep = max_len.saturating_sub(3); // Reserve 3 chars for "..."
        format!("{}...", url.chars().take(keep).collect::<String>())
    } else {
        url.to_string()
    }
}

/// Categorize error for user-friendly display
pub fn categorize_error(error: &UrlPadError) -> &'static str {
    match error {
        UrlPadError::RemoteStatus { status: 403, .. } => "blocked",
        UrlPadError::RemoteStatus { status: 401, .. } => "unauthorized",
        UrlPadError::RemoteStatus { status: 404, .. } => "not found",
        UrlPadError::RemoteStatus { .. } => "http error",
        UrlPadError::Network(message) => {
            let message = message.to_lowercase();
            if message.contains("timed out") || message.contains("timeout") {
                "timeout"
            } else if message.contains("dns") || message.contains("resolve") {
                "dns error"
            } else if message.contains("connect") {
                "connection error"
            } else {
                "fetch error"
            }
        }
        UrlPadError::Snapshot(_) => "snapshot error",
        _ => "fetch error",
    }
}
