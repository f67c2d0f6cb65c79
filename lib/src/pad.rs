use crate::codec::{self, DecodePolicy};
use crate::error::{Result, UrlPadError};
use crate::models::entry::{Entry, EntryId};
use crate::snapshot;
use crate::utils::IMAGES_SUBFOLDER;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A named collection of entries backed by one JSON document and one images folder
#[derive(Debug)]
pub struct Pad {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl Pad {
    /// An empty pad that will be saved to `path`
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
        }
    }

    /// Load the pad at `path`; a missing file is an empty pad
    ///
    /// With [`DecodePolicy::Skip`] the records that failed to decode are returned
    /// alongside the pad.
    pub fn open(path: &Path, policy: DecodePolicy) -> Result<(Self, Vec<UrlPadError>)> {
        let mut pad = Self::new(path);
        if !path.exists() {
            log::debug!("No pad at {}, starting empty", path.display());
            return Ok((pad, Vec::new()));
        }

        let json = fs::read_to_string(path)?;
        let report = codec::decode_document(&json, policy)?;
        log::info!(
            "Loaded {} entries from {}",
            report.entries.len(),
            path.display()
        );
        pad.entries = report.entries;
        Ok((pad, report.failures))
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, codec::to_json(&self.entries)?)?;
        snapshot::ensure_placeholder(&self.images_dir())?;
        log::info!(
            "Saved {} entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder holding the pad document; snapshot paths are relative to it
    pub fn folder(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.folder().join(IMAGES_SUBFOLDER)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Look up an entry by its 1-based position
    pub fn get_index(&self, index: usize) -> Result<&Entry> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .ok_or_else(|| UrlPadError::EntryNotFound(format!("#{}", index)))
    }

    pub fn get_index_mut(&mut self, index: usize) -> Result<&mut Entry> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get_mut(i))
            .ok_or_else(|| UrlPadError::EntryNotFound(format!("#{}", index)))
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| e.id() == id)?;
        Some(self.entries.remove(pos))
    }

    /// Entries carrying `tag`; the sentinel tag matches everything
    pub fn entries_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |e| e.tags.contains(tag))
    }

    /// Every tag in the pad with the number of entries carrying it
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            for tag in entry.tags.iter() {
                *counts.entry(tag.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::SnapshotState;
    use crate::tags::ALL_TAG;
    use rstest::rstest;
    use tempfile::TempDir;

    fn tagged(url: &str, tags: &[&str]) -> Entry {
        let mut entry = Entry::new(url);
        for tag in tags {
            entry.add_tag(tag);
        }
        entry
    }

    #[test]
    fn test_open_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let (pad, failures) = Pad::open(&dir.path().join("pad.json"), DecodePolicy::Skip).unwrap();
        assert!(pad.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_save_and_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/pad.json");
        let mut pad = Pad::new(&path);
        let mut entry = tagged("https://example.com", &["web"]);
        entry.name = "Example Domain".to_string();
        entry.snapshot = SnapshotState::Resolved("images/page-1.png".to_string());
        pad.push(entry);
        pad.push(tagged("https://rust-lang.org", &["rust", "web"]));
        pad.save().unwrap();

        let (loaded, failures) = Pad::open(&path, DecodePolicy::Abort).unwrap();
        assert!(failures.is_empty());
        assert_eq!(loaded.entries(), pad.entries());
        assert_eq!(loaded.folder(), dir.path().join("nested"));
        assert_eq!(loaded.images_dir(), dir.path().join("nested/images"));
        assert!(loaded
            .images_dir()
            .join(crate::models::PLACEHOLDER_FILE)
            .is_file());
    }

    #[test]
    fn test_open_reports_skipped_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pad.json");
        fs::write(
            &path,
            r#"[{"URL":"https://a.example","Name":"A","Description":"","DateAdded":"01 January 24 , 10:00:00","pageSnapshot":"images/octopus.png","Tags":["all"]},
                {"URL":"https://b.example","Name":"B","Description":"","DateAdded":"01 January 24 , 10:00:00","pageSnapshot":"images/octopus.png"}]"#,
        )
        .unwrap();

        let (pad, failures) = Pad::open(&path, DecodePolicy::Skip).unwrap();
        assert_eq!(pad.len(), 1);
        assert_eq!(failures.len(), 1);
        assert!(Pad::open(&path, DecodePolicy::Abort).is_err());
    }

    #[rstest]
    #[case("pad.json", ".")]
    #[case("/tmp/pads/pad.json", "/tmp/pads")]
    fn test_folder(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(Pad::new(Path::new(path)).folder(), PathBuf::from(expected));
    }

    #[test]
    fn test_filter_and_counts() {
        let mut pad = Pad::new(Path::new("pad.json"));
        pad.push(tagged("https://a.example", &["rust"]));
        pad.push(tagged("https://b.example", &["rust", "video"]));
        pad.push(tagged("https://c.example", &[]));

        assert_eq!(pad.entries_tagged("rust").count(), 2);
        assert_eq!(pad.entries_tagged(ALL_TAG).count(), 3);
        assert_eq!(pad.entries_tagged("missing").count(), 0);

        let counts = pad.tag_counts();
        assert_eq!(counts[ALL_TAG], 3);
        assert_eq!(counts["rust"], 2);
        assert_eq!(counts["video"], 1);
    }

    #[test]
    fn test_index_lookup() {
        let mut pad = Pad::new(Path::new("pad.json"));
        pad.push(Entry::new("https://a.example"));
        pad.push(Entry::new("https://b.example"));

        assert_eq!(pad.get_index(2).unwrap().url, "https://b.example");
        assert!(matches!(pad.get_index(0), Err(UrlPadError::EntryNotFound(_))));
        assert!(pad.get_index(3).is_err());

        let id = pad.get_index(1).unwrap().id();
        assert!(pad.remove(id).is_some());
        assert!(pad.get(id).is_none());
        assert_eq!(pad.len(), 1);
    }
}
