//! Directory-listing cache: the only thing the production filesystem
//! caches (spec §4.3 — file reads are never cached). Entries carry a TTL
//! and are additionally invalidated by filesystem change notifications;
//! invalidation removes the entry before a subsequent reader can observe
//! it, so there is no window where a reader sees stale data past a known
//! change.

use crate::types::DirEntry;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;
use tokio::sync::RwLock;

struct CacheEntry {
    entries: Vec<DirEntry>,
    expires_at: Instant,
}

pub struct DirCache {
    ttl: Duration,
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

impl DirCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, dir: &Path) -> Option<Vec<DirEntry>> {
        let guard = self.entries.read().await;
        let entry = guard.get(dir)?;
        if entry.expires_at < Instant::now() {
            return None;
        }
        Some(entry.entries.clone())
    }

    pub async fn put(&self, dir: PathBuf, entries: Vec<DirEntry>) {
        let mut guard = self.entries.write().await;
        guard.insert(
            dir,
            CacheEntry {
                entries,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drops the cached listing for `dir`, called on a filesystem change
    /// notification for that directory.
    pub async fn invalidate(&self, dir: &Path) {
        let mut guard = self.entries.write().await;
        guard.remove(dir);
    }

    pub async fn invalidate_all(&self) {
        let mut guard = self.entries.write().await;
        guard.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;

    fn entries() -> Vec<DirEntry> {
        vec![DirEntry {
            path: PathBuf::from("/tmp/a"),
            kind: EntryKind::File,
        }]
    }

    #[tokio::test]
    async fn put_then_get_round_trips_within_ttl() {
        let cache = DirCache::new(Duration::from_secs(60));
        cache.put(PathBuf::from("/tmp"), entries()).await;
        assert_eq!(cache.get(Path::new("/tmp")).await, Some(entries()));
    }

    #[tokio::test]
    async fn expired_entry_is_not_returned() {
        let cache = DirCache::new(Duration::from_millis(1));
        cache.put(PathBuf::from("/tmp"), entries()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get(Path::new("/tmp")).await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_entry_immediately() {
        let cache = DirCache::new(Duration::from_secs(60));
        cache.put(PathBuf::from("/tmp"), entries()).await;
        cache.invalidate(Path::new("/tmp")).await;
        assert_eq!(cache.get(Path::new("/tmp")).await, None);
    }
}
