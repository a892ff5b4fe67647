use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Snapshot of a destination directory taken at the start of a run.
///
/// Re-read on every invocation; never cached between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationTree {
    entries: BTreeMap<PathBuf, DestinationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationEntry {
    Directory,
    File(Vec<u8>),
}

impl DestinationTree {
    /// Snapshot of a destination that does not exist yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, entry: DestinationEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn with_entry(mut self, path: impl Into<PathBuf>, entry: DestinationEntry) -> Self {
        self.insert(path, entry);
        self
    }

    pub fn get(&self, path: &Path) -> Option<&DestinationEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
