//! Read-before-write ledger (spec §3 `Session.FilesRead`/`FilesModified`,
//! §4.4.1). `FilesRead` is authoritative for the safety envelope's check;
//! `FilesModified` is advisory, consumed by diff/verification tooling.

use sha2::Digest;
use sha2::Sha256;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

/// What the session knows about the last recorded read of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord {
    pub digest: String,
    pub line_count: usize,
}

impl ReadRecord {
    fn new(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self {
            digest: format!("{:x}", hasher.finalize()),
            line_count: content.lines().count(),
        }
    }
}

/// Tracks reads and writes for the read-before-write invariant (spec §8).
#[derive(Debug, Clone, Default)]
pub struct FileLedger {
    read: HashMap<PathBuf, ReadRecord>,
    modified: HashSet<PathBuf>,
}

impl FileLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a read of `path` with its current `content`, overwriting any
    /// prior record (a later read always reflects the freshest digest).
    pub fn track_read(&mut self, path: impl Into<PathBuf>, content: &str) {
        self.read.insert(path.into(), ReadRecord::new(content));
    }

    pub fn was_read(&self, path: &Path) -> bool {
        self.read.contains_key(path)
    }

    pub fn read_record(&self, path: &Path) -> Option<&ReadRecord> {
        self.read.get(path)
    }

    /// True when `path` was read and its digest still matches `content`
    /// (spec §9 open question: advisory staleness check against external edits).
    pub fn is_fresh(&self, path: &Path, content: &str) -> bool {
        match self.read.get(path) {
            Some(record) => record.digest == ReadRecord::new(content).digest,
            None => false,
        }
    }

    pub fn mark_modified(&mut self, path: impl Into<PathBuf>) {
        self.modified.insert(path.into());
    }

    pub fn modified_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.modified.iter()
    }

    pub fn read_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.read.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_then_modify_is_tracked() {
        let mut ledger = FileLedger::new();
        assert!(!ledger.was_read(Path::new("a.txt")));
        ledger.track_read("a.txt", "line 1\nline 2");
        assert!(ledger.was_read(Path::new("a.txt")));
        assert_eq!(ledger.read_record(Path::new("a.txt")).expect("record").line_count, 2);
        ledger.mark_modified("a.txt");
        assert_eq!(ledger.modified_files().count(), 1);
    }

    #[test]
    fn freshness_detects_drift() {
        let mut ledger = FileLedger::new();
        ledger.track_read("a.txt", "original");
        assert!(ledger.is_fresh(Path::new("a.txt"), "original"));
        assert!(!ledger.is_fresh(Path::new("a.txt"), "edited externally"));
    }
}
