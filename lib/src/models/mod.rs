pub mod entry;

pub use entry::{Entry, EntryId, SnapshotState, PLACEHOLDER_FILE, PLACEHOLDER_SNAPSHOT};
