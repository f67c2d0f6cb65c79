use crate::tags::TagSet;
use crate::utils;
use chrono::{Local, NaiveDateTime, SubsecRound};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name of the bundled placeholder inside the images folder
pub const PLACEHOLDER_FILE: &str = "octopus.png";

/// Bundled image shown until a snapshot has been resolved
pub const PLACEHOLDER_SNAPSHOT: &str = "images/octopus.png";

/// In-memory handle for an entry; not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress of the background snapshot step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotState {
    /// Not resolved yet; the placeholder is shown
    Pending,
    /// Path relative to the pad folder (or a full URI from an older document)
    Resolved(String),
    /// Render or thumbnail extraction failed; the placeholder is shown
    Failed(String),
}

impl SnapshotState {
    /// Stored snapshot paths equal to the placeholder mean nothing was resolved yet
    pub fn from_stored(path: &str) -> Self {
        if path.is_empty() || path == PLACEHOLDER_SNAPSHOT {
            SnapshotState::Pending
        } else {
            SnapshotState::Resolved(path.to_string())
        }
    }
}

/// One bookmarked URL plus its enrichment and tags
#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    pub url: String,
    /// Page title; empty until the fetch completes
    pub name: String,
    /// Text of the first paragraph, or empty
    pub description: String,
    /// Local wall-clock time, whole seconds
    pub date_added: NaiveDateTime,
    pub snapshot: SnapshotState,
    pub tags: TagSet,
}

impl Entry {
    /// A fresh entry waiting for its page fetch
    pub fn new(url: &str) -> Self {
        Self {
            id: EntryId::new(),
            url: url.trim().to_string(),
            name: String::new(),
            description: String::new(),
            date_added: now(),
            snapshot: SnapshotState::Pending,
            tags: TagSet::new(),
        }
    }

    /// An entry rebuilt from storage; no page fetch will run for it
    pub fn restored(
        url: String,
        name: String,
        description: String,
        date_added: NaiveDateTime,
        snapshot_path: &str,
        tags: TagSet,
    ) -> Self {
        Self {
            id: EntryId::new(),
            url,
            name,
            description,
            date_added,
            snapshot: SnapshotState::from_stored(snapshot_path),
            tags,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The image to display: the resolved snapshot or the placeholder
    pub fn snapshot_path(&self) -> &str {
        match &self.snapshot {
            SnapshotState::Resolved(path) => path,
            SnapshotState::Pending | SnapshotState::Failed(_) => PLACEHOLDER_SNAPSHOT,
        }
    }

    /// Snapshot as a `file:///` URI under the given pad folder
    pub fn snapshot_uri(&self, pad_folder: &Path) -> String {
        let path = self.snapshot_path();
        if path.contains("://") {
            return path.to_string();
        }
        utils::file_uri(&pad_folder.join(path))
    }

    /// Local file behind a resolved snapshot, if it is still on disk
    pub fn resolved_snapshot_file(&self, pad_folder: &Path) -> Option<PathBuf> {
        let SnapshotState::Resolved(path) = &self.snapshot else {
            return None;
        };
        let file = match path.strip_prefix("file://") {
            Some(rest) => PathBuf::from(rest),
            None if path.contains("://") => return None,
            None => pad_folder.join(path),
        };
        file.is_file().then_some(file)
    }

    /// Record the fetched page text and stamp the fetch time
    pub fn apply_fetch(&mut self, name: String, description: String) {
        self.name = name;
        self.description = description;
        self.date_added = now();
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.tags.insert(tag)
    }

    pub fn delete_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }
}

/// Entries compare by persisted content; the in-memory id is ignored
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && self.name == other.name
            && self.description == other.description
            && self.date_added == other.date_added
            && self.snapshot_path() == other.snapshot_path()
            && self.tags == other.tags
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}
