use crate::config::Config;
use crate::error::{Result, UrlPadError};
use crate::models::entry::{Entry, EntryId, SnapshotState};
use crate::pad::Pad;
use crate::pipeline::{Pipeline, PipelineEvent, Services};
use crate::tags;
use std::collections::HashMap;
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Receives pad changes on the thread that owns the session
pub trait EntrySink {
    /// Called once per entry that was fetched or restored
    fn notify_new_entry(&mut self, entry: &Entry);

    /// A fresh URL could not be fetched; no entry was added
    fn notify_fetch_failed(&mut self, _url: &str, _error: &UrlPadError) {}

    /// The entry's snapshot was resolved or gave up
    fn notify_snapshot_changed(&mut self, _entry: &Entry) {}

    /// A stored record was skipped while loading the pad
    fn notify_decode_failed(&mut self, _error: &UrlPadError) {}
}

/// Sink that only logs
pub struct LogSink;

impl EntrySink for LogSink {
    fn notify_new_entry(&mut self, entry: &Entry) {
        log::info!("New entry: {} ({})", entry.url, entry.name);
    }

    fn notify_fetch_failed(&mut self, url: &str, error: &UrlPadError) {
        log::warn!("Not added {}: {}", url, error);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Fetching,
    Snapshotting,
}

/// The pad plus its background pipeline, owned by a single thread
///
/// All entry mutations happen here: pipeline results are applied by
/// [`PadSession::pump`] or [`PadSession::run_until_idle`] on the owning thread.
pub struct PadSession {
    pad: Pad,
    pipeline: Pipeline,
    events: Receiver<PipelineEvent>,
    sink: Box<dyn EntrySink>,
    in_flight: HashMap<EntryId, Stage>,
}

impl PadSession {
    /// Start a session over `pad`; entries already in it are left as they are
    pub fn new(pad: Pad, services: Services, sink: Box<dyn EntrySink>) -> Result<Self> {
        let (pipeline, events) = Pipeline::new(services, &pad.folder())?;
        Ok(Self {
            pad,
            pipeline,
            events,
            sink,
            in_flight: HashMap::new(),
        })
    }

    /// Load the pad at `path` and send every stored entry down the restore path
    pub fn open(path: &Path, config: &Config, mut sink: Box<dyn EntrySink>) -> Result<Self> {
        let (pad, failures) = Pad::open(path, config.decode_policy)?;
        for failure in &failures {
            sink.notify_decode_failed(failure);
        }
        let mut session = Self::new(pad, Services::from_config(config)?, sink)?;
        session.restore_all()?;
        Ok(session)
    }

    /// Publish every entry in the pad and re-derive its snapshot in the background
    pub fn restore_all(&mut self) -> Result<usize> {
        for entry in self.pad.entries() {
            self.pipeline.submit_restore(entry)?;
            self.in_flight.insert(entry.id(), Stage::Snapshotting);
            self.sink.notify_new_entry(entry);
        }
        Ok(self.pad.len())
    }

    /// Add a URL; it appears in the pad once its page has been fetched
    pub fn add_url(&mut self, url: &str, tags: &[String]) -> Result<EntryId> {
        if url.trim().is_empty() {
            return Err(UrlPadError::InvalidInput("empty URL".to_string()));
        }

        let mut entry = Entry::new(url);
        for tag in tags {
            entry.add_tag(tag);
        }
        let id = entry.id();
        self.pipeline.submit_fetch(entry)?;
        self.in_flight.insert(id, Stage::Fetching);
        log::debug!("Queued {} as {}", url.trim(), id);
        Ok(id)
    }

    /// Apply every event that is ready without blocking; returns how many
    pub fn pump(&mut self) -> usize {
        let ready: Vec<PipelineEvent> = self.events.try_iter().collect();
        let count = ready.len();
        for event in ready {
            self.apply(event);
        }
        count
    }

    /// Apply events until nothing is in flight; false if `timeout` ran out first
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.in_flight.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("{} entries still in flight", self.in_flight.len());
                    return false;
                }
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn apply(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Published(entry) => {
                let id = entry.id();
                self.in_flight.insert(id, Stage::Snapshotting);
                self.pad.push(entry);
                if let Some(entry) = self.pad.get(id) {
                    self.sink.notify_new_entry(entry);
                }
            }
            PipelineEvent::FetchFailed { id, url, error } => {
                self.in_flight.remove(&id);
                self.sink.notify_fetch_failed(&url, &error);
            }
            PipelineEvent::SnapshotResolved { id, path } => {
                self.set_snapshot(id, SnapshotState::Resolved(path));
            }
            PipelineEvent::SnapshotFailed { id, reason } => {
                self.set_snapshot(id, SnapshotState::Failed(reason));
            }
        }
    }

    fn set_snapshot(&mut self, id: EntryId, state: SnapshotState) {
        self.in_flight.remove(&id);
        let folder = self.pad.folder();
        let Some(entry) = self.pad.get_mut(id) else {
            log::debug!("Snapshot for removed entry {} ignored", id);
            return;
        };

        // A failed re-derivation keeps an earlier image that is still on disk
        if let SnapshotState::Failed(reason) = &state {
            if let Some(file) = entry.resolved_snapshot_file(&folder) {
                log::warn!(
                    "Keeping {} for {}: {}",
                    file.display(),
                    entry.url,
                    reason
                );
                return;
            }
        }

        entry.snapshot = state;
        self.sink.notify_snapshot_changed(entry);
    }

    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    pub fn entries(&self) -> &[Entry] {
        self.pad.entries()
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.pad.get(id)
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.pad
            .get_mut(id)
            .ok_or_else(|| UrlPadError::EntryNotFound(id.to_string()))
    }

    /// Add comma-separated tags to an entry; returns how many were new
    pub fn add_tags(&mut self, id: EntryId, tags_str: &str) -> Result<usize> {
        let entry = self.entry_mut(id)?;
        Ok(tags::parse_tags(tags_str)
            .iter()
            .filter(|tag| entry.add_tag(tag))
            .count())
    }

    pub fn delete_tag(&mut self, id: EntryId, tag: &str) -> Result<bool> {
        Ok(self.entry_mut(id)?.delete_tag(tag))
    }

    pub fn clear_tags(&mut self, id: EntryId) -> Result<()> {
        self.entry_mut(id)?.clear_tags();
        Ok(())
    }

    pub fn remove_entry(&mut self, id: EntryId) -> Result<Entry> {
        self.pad
            .remove(id)
            .ok_or_else(|| UrlPadError::EntryNotFound(id.to_string()))
    }

    pub fn save(&self) -> Result<()> {
        self.pad.save()
    }

    /// Wait for background work, stop the pools and hand back the pad
    pub fn finish(mut self, timeout: Duration) -> Pad {
        self.run_until_idle(timeout);
        self.pipeline.shutdown();
        self.pump();
        self.pad
    }
}
