//! Background enrichment of entries
//!
//! Page fetches and snapshot resolution run on two bounded worker pools. Nothing
//! here touches the pad: every result travels back as a [`PipelineEvent`] over
//! one channel, and the thread that owns the pad applies it (see
//! [`crate::session::PadSession`]).
//!
//! Per entry, a fresh URL goes `Fetching -> Published -> snapshot resolved/failed`
//! or `Fetching -> FetchFailed`. A restored entry only has its snapshot
//! re-derived. `Published` is always sent before the entry's snapshot job is
//! queued, so the owner never sees a snapshot event for an entry it does not
//! hold yet. No ordering holds between different entries.

use crate::config::Config;
use crate::error::{Result, UrlPadError};
use crate::fetch::{HttpFetcher, PageSource};
use crate::models::entry::{Entry, EntryId};
use crate::snapshot::SnapshotResolver;
use crate::worker::{Spawner, WorkerPool};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

#[derive(Debug)]
pub enum PipelineEvent {
    /// Page fetched; the entry carries its name, description and date
    Published(Entry),
    /// Fetch failed; the entry is dropped and never published
    FetchFailed {
        id: EntryId,
        url: String,
        error: UrlPadError,
    },
    /// Snapshot stored at `path`, relative to the pad folder
    SnapshotResolved { id: EntryId, path: String },
    SnapshotFailed { id: EntryId, reason: String },
}

/// The collaborators a pipeline runs with
#[derive(Clone)]
pub struct Services {
    pub pages: Arc<dyn PageSource>,
    pub resolver: SnapshotResolver,
    pub workers: usize,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            pages: Arc::new(HttpFetcher::from_config(config)?),
            resolver: SnapshotResolver::from_config(config)?,
            workers: config.worker_threads,
        })
    }
}

#[derive(Clone)]
struct SnapshotStage {
    resolver: Arc<SnapshotResolver>,
    pad_folder: Arc<Path>,
    events: Sender<PipelineEvent>,
}

impl SnapshotStage {
    fn schedule(&self, spawner: &Spawner, id: EntryId, url: String) {
        let stage = self.clone();
        if let Err(e) = spawner.spawn(move || stage.run(id, &url)) {
            let _ = self.events.send(PipelineEvent::SnapshotFailed {
                id,
                reason: e.to_string(),
            });
        }
    }

    fn run(&self, id: EntryId, url: &str) {
        let event = match self.resolver.resolve(url, &self.pad_folder) {
            Ok(path) => {
                log::debug!("Snapshot for {} stored at {}", url, path);
                PipelineEvent::SnapshotResolved { id, path }
            }
            Err(e) => {
                log::warn!("Snapshot for {} failed: {}", url, e);
                PipelineEvent::SnapshotFailed {
                    id,
                    reason: e.to_string(),
                }
            }
        };
        let _ = self.events.send(event);
    }
}

fn run_fetch(
    mut entry: Entry,
    pages: &dyn PageSource,
    stage: &SnapshotStage,
    snapshots: &Spawner,
) {
    let id = entry.id();
    log::debug!("Fetching {}", entry.url);

    match pages.fetch(&entry.url) {
        Ok(summary) => {
            entry.apply_fetch(summary.title, summary.description);
            let url = entry.url.clone();
            log::info!("Fetched '{}' from {}", entry.name, url);
            if stage.events.send(PipelineEvent::Published(entry)).is_err() {
                log::debug!("Event receiver gone, skipping snapshot for {}", url);
                return;
            }
            stage.schedule(snapshots, id, url);
        }
        Err(error) => {
            match &error {
                UrlPadError::RemoteStatus { status, .. } => {
                    log::warn!("Dropping {}: HTTP status {}", entry.url, status)
                }
                other => log::warn!("Dropping {}: {}", entry.url, other),
            }
            let _ = stage.events.send(PipelineEvent::FetchFailed {
                id,
                url: entry.url,
                error,
            });
        }
    }
}

pub struct Pipeline {
    fetch_pool: WorkerPool,
    snapshot_pool: WorkerPool,
    pages: Arc<dyn PageSource>,
    stage: SnapshotStage,
}

impl Pipeline {
    /// Start both pools; the receiver must be drained by the pad's owning thread
    pub fn new(services: Services, pad_folder: &Path) -> Result<(Self, Receiver<PipelineEvent>)> {
        let (events, rx) = channel();
        let pipeline = Self {
            fetch_pool: WorkerPool::new("urlpad-fetch", services.workers)?,
            snapshot_pool: WorkerPool::new("urlpad-snapshot", services.workers)?,
            pages: services.pages,
            stage: SnapshotStage {
                resolver: Arc::new(services.resolver),
                pad_folder: Arc::from(PathBuf::from(pad_folder).into_boxed_path()),
                events,
            },
        };
        Ok((pipeline, rx))
    }

    fn snapshot_spawner(&self) -> Result<Spawner> {
        self.snapshot_pool
            .spawner()
            .ok_or_else(|| UrlPadError::Other("snapshot pool is shut down".to_string()))
    }

    /// Fresh-URL path: fetch the page, publish, then resolve the snapshot
    pub fn submit_fetch(&self, entry: Entry) -> Result<()> {
        let snapshots = self.snapshot_spawner()?;
        let pages = Arc::clone(&self.pages);
        let stage = self.stage.clone();
        self.fetch_pool
            .spawn(move || run_fetch(entry, pages.as_ref(), &stage, &snapshots))
    }

    /// Restore path: no page fetch, only re-derive the snapshot
    pub fn submit_restore(&self, entry: &Entry) -> Result<()> {
        let snapshots = self.snapshot_spawner()?;
        self.stage.schedule(&snapshots, entry.id(), entry.url.clone());
        Ok(())
    }

    /// Finish queued work and stop the pools
    pub fn shutdown(&mut self) {
        // Fetch jobs hold snapshot spawners, so they go first
        self.fetch_pool.shutdown();
        self.snapshot_pool.shutdown();
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fetch::PageSummary;
    use crate::models::entry::PLACEHOLDER_SNAPSHOT;
    use crate::snapshot::tests::{recording_resolver, Recorder};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Canned pages keyed by URL; unknown URLs fail like a dead host
    #[derive(Default)]
    pub(crate) struct FakePages {
        pub(crate) pages: HashMap<String, (String, String)>,
        pub(crate) statuses: HashMap<String, u16>,
        pub(crate) delays: HashMap<String, Duration>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl FakePages {
        pub(crate) fn with_page(mut self, url: &str, title: &str, desc: &str) -> Self {
            self.pages
                .insert(url.to_string(), (title.to_string(), desc.to_string()));
            self
        }

        pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
            self.statuses.insert(url.to_string(), status);
            self
        }

        pub(crate) fn with_delay(mut self, url: &str, delay: Duration) -> Self {
            self.delays.insert(url.to_string(), delay);
            self
        }
    }

    impl PageSource for FakePages {
        fn fetch(&self, url: &str) -> Result<PageSummary> {
            self.calls.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delays.get(url) {
                thread::sleep(*delay);
            }
            if let Some(status) = self.statuses.get(url) {
                return Err(UrlPadError::remote_status(url, *status));
            }
            match self.pages.get(url) {
                Some((title, desc)) => Ok(PageSummary {
                    url: url.to_string(),
                    title: title.clone(),
                    description: desc.clone(),
                }),
                None => Err(UrlPadError::Network(format!("dns error: {}", url))),
            }
        }
    }

    fn services(pages: FakePages, recorder: Arc<Recorder>) -> Services {
        Services {
            pages: Arc::new(pages),
            resolver: recording_resolver(recorder),
            workers: 4,
        }
    }

    fn collect(rx: &Receiver<PipelineEvent>, count: usize) -> Vec<PipelineEvent> {
        (0..count)
            .map(|_| rx.recv_timeout(Duration::from_secs(10)).unwrap())
            .collect()
    }

    #[test]
    fn test_fetch_publishes_then_resolves() {
        let dir = TempDir::new().unwrap();
        let pages = FakePages::default().with_page("https://example.com", "Example Domain", "Intro");
        let (pipeline, rx) = Pipeline::new(services(pages, Arc::default()), dir.path()).unwrap();

        let entry = Entry::new("https://example.com");
        let id = entry.id();
        pipeline.submit_fetch(entry).unwrap();

        let events = collect(&rx, 2);
        match &events[0] {
            PipelineEvent::Published(entry) => {
                assert_eq!(entry.id(), id);
                assert_eq!(entry.name, "Example Domain");
                assert_eq!(entry.description, "Intro");
                assert_eq!(entry.snapshot_path(), PLACEHOLDER_SNAPSHOT);
            }
            other => panic!("expected Published first, got {other:?}"),
        }
        match &events[1] {
            PipelineEvent::SnapshotResolved { id: got, path } => {
                assert_eq!(*got, id);
                assert!(dir.path().join(path).exists());
            }
            other => panic!("expected SnapshotResolved, got {other:?}"),
        }
    }

    #[rstest::rstest]
    #[case(FakePages::default().with_status("https://example.com/gone", 404))]
    #[case(FakePages::default().with_status("https://example.com/gone", 503))]
    #[case(FakePages::default())]
    fn test_fetch_failure_is_never_published(#[case] pages: FakePages) {
        let dir = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder::default());
        let (mut pipeline, rx) =
            Pipeline::new(services(pages, recorder.clone()), dir.path()).unwrap();

        pipeline
            .submit_fetch(Entry::new("https://example.com/gone"))
            .unwrap();
        pipeline.shutdown();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PipelineEvent::FetchFailed { url, error, .. } => {
                assert_eq!(url, "https://example.com/gone");
                assert!(error.is_fetch_failure());
            }
            other => panic!("expected FetchFailed, got {other:?}"),
        }
        assert!(recorder.pages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_restore_skips_page_fetch() {
        let dir = TempDir::new().unwrap();
        let pages = Arc::new(FakePages::default());
        let recorder = Arc::new(Recorder::default());
        let services = Services {
            pages: pages.clone(),
            resolver: recording_resolver(recorder.clone()),
            workers: 2,
        };
        let (pipeline, rx) = Pipeline::new(services, dir.path()).unwrap();

        let entry = Entry::new("https://youtu.be/dQw4w9WgXcQ");
        pipeline.submit_restore(&entry).unwrap();

        let events = collect(&rx, 1);
        assert!(matches!(
            &events[0],
            PipelineEvent::SnapshotResolved { path, .. } if path == "images/video-dQw4w9WgXcQ.png"
        ));
        assert!(pages.calls.lock().unwrap().is_empty());
        assert_eq!(recorder.videos.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_snapshot_failure_event() {
        let dir = TempDir::new().unwrap();
        let pages = FakePages::default().with_page("https://example.com", "Example Domain", "");
        let (pipeline, rx) =
            Pipeline::new(services(pages, Arc::new(Recorder::failing())), dir.path()).unwrap();

        pipeline.submit_fetch(Entry::new("https://example.com")).unwrap();
        let events = collect(&rx, 2);
        assert!(matches!(events[0], PipelineEvent::Published(_)));
        assert!(matches!(
            &events[1],
            PipelineEvent::SnapshotFailed { reason, .. } if reason.contains("renderer crashed")
        ));
    }

    #[test]
    fn test_no_ordering_between_entries() {
        let dir = TempDir::new().unwrap();
        let pages = FakePages::default()
            .with_page("https://slow.example", "Slow", "")
            .with_page("https://fast.example", "Fast", "")
            .with_delay("https://slow.example", Duration::from_millis(300));
        let (pipeline, rx) = Pipeline::new(services(pages, Arc::default()), dir.path()).unwrap();

        pipeline.submit_fetch(Entry::new("https://slow.example")).unwrap();
        pipeline.submit_fetch(Entry::new("https://fast.example")).unwrap();

        let first_published = collect(&rx, 4)
            .into_iter()
            .find_map(|e| match e {
                PipelineEvent::Published(entry) => Some(entry.name),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_published, "Fast");
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let dir = TempDir::new().unwrap();
        let (mut pipeline, _rx) =
            Pipeline::new(services(FakePages::default(), Arc::default()), dir.path()).unwrap();
        pipeline.shutdown();
        assert!(pipeline.submit_fetch(Entry::new("https://example.com")).is_err());
        assert!(pipeline.submit_restore(&Entry::new("https://example.com")).is_err());
    }
}
