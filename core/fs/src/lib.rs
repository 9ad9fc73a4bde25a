//! Filesystem abstraction (spec §4.3): a uniform `FileSystem` trait with a
//! real, tokio-backed implementation and an in-memory mock for tests of
//! dependent crates. The real implementation caches directory listings only,
//! with a TTL, invalidated by filesystem change notifications; file reads
//! are never cached.

mod binary;
mod cache;
mod error;
mod types;

pub use binary::is_binary;
pub use cache::DirCache;
pub use error::from_io_error;
pub use error::FsError;
pub use error::Result;
pub use types::DirEntry;
pub use types::EntryKind;
pub use types::Stat;

use async_trait::async_trait;
use error::IsBinarySnafu;
use error::NotFoundSnafu;
use notify::RecursiveMode;
use notify::Watcher;
use snafu::ensure;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::warn;

const DEFAULT_DIR_CACHE_TTL: Duration = Duration::from_secs(5);

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, contents: &str) -> Result<()>;
    async fn make_dir(&self, path: &Path) -> Result<()>;
    async fn stat(&self, path: &Path) -> Result<Stat>;
    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;
    async fn walk(&self, root: &Path) -> Result<Vec<DirEntry>>;
}

/// Production filesystem. Directory listings are cached with a TTL and
/// invalidated eagerly on `notify` change events; reads always hit disk.
pub struct RealFileSystem {
    dir_cache: Arc<DirCache>,
    // Kept alive for the lifetime of the filesystem; dropping it stops
    // watching. Watches are best-effort: failure to watch a path only
    // disables early invalidation for that subtree, the TTL still applies.
    _watcher: StdMutex<Option<notify::RecommendedWatcher>>,
}

impl RealFileSystem {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_DIR_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let dir_cache = Arc::new(DirCache::new(ttl));
        Self {
            dir_cache,
            _watcher: StdMutex::new(None),
        }
    }

    /// Starts watching `root` for filesystem changes, invalidating cached
    /// directory listings as events arrive. Best-effort: a watch failure is
    /// logged and otherwise ignored, the TTL remains the fallback.
    pub fn watch(&self, root: &Path) {
        let dir_cache = Arc::clone(&self.dir_cache);
        let (tx, rx) = std::sync::mpsc::channel();
        let watcher = notify::recommended_watcher(tx).and_then(|mut watcher| {
            watcher.watch(root, RecursiveMode::Recursive)?;
            Ok(watcher)
        });
        match watcher {
            Ok(watcher) => {
                if let Ok(mut guard) = self._watcher.lock() {
                    *guard = Some(watcher);
                }
                tokio::spawn(async move {
                    while let Ok(Ok(event)) = rx.recv() {
                        for path in event_dirs(&event) {
                            dir_cache.invalidate(&path).await;
                        }
                    }
                });
            }
            Err(err) => warn!(?root, %err, "failed to start filesystem watcher"),
        }
    }

    async fn read_dir(path: &Path) -> Result<Vec<DirEntry>> {
        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| from_io_error(path.display().to_string(), e))?;
        let mut out = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| from_io_error(path.display().to_string(), e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| from_io_error(entry.path().display().to_string(), e))?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            out.push(DirEntry {
                path: entry.path(),
                kind,
            });
        }
        Ok(out)
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn event_dirs(event: &notify::Event) -> Vec<PathBuf> {
    event
        .paths
        .iter()
        .filter_map(|p| p.parent().map(Path::to_path_buf))
        .collect()
}

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| from_io_error(path.display().to_string(), e))?;
        ensure!(
            !is_binary(path, &bytes),
            IsBinarySnafu {
                path: path.display().to_string(),
            }
        );
        String::from_utf8(bytes).map_err(|e| {
            from_io_error(
                path.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| from_io_error(parent.display().to_string(), e))?;
        }
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| from_io_error(path.display().to_string(), e))?;
        if let Some(parent) = path.parent() {
            self.dir_cache.invalidate(parent).await;
        }
        Ok(())
    }

    async fn make_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| from_io_error(path.display().to_string(), e))?;
        if let Some(parent) = path.parent() {
            self.dir_cache.invalidate(parent).await;
        }
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<Stat> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| from_io_error(path.display().to_string(), e))?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Ok(Stat {
            kind,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        if let Some(cached) = self.dir_cache.get(path).await {
            return Ok(cached);
        }
        let entries = Self::read_dir(path).await?;
        self.dir_cache
            .put(path.to_path_buf(), entries.clone())
            .await;
        Ok(entries)
    }

    async fn walk(&self, root: &Path) -> Result<Vec<DirEntry>> {
        let mut stack = vec![root.to_path_buf()];
        let mut out = Vec::new();
        while let Some(dir) = stack.pop() {
            let entries = self.list_dir(&dir).await?;
            for entry in entries {
                if entry.kind == EntryKind::Directory {
                    stack.push(entry.path.clone());
                }
                out.push(entry);
            }
        }
        Ok(out)
    }
}

/// In-memory filesystem for tests of dependent crates. Directories are
/// implicit: any path that is a prefix of a stored file, or that was
/// explicitly created via `make_dir`, is a directory.
#[derive(Default)]
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
    dirs: RwLock<HashMap<PathBuf, ()>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        self.files.write().await.insert(path, contents.into());
    }

    fn children_of<'a>(
        dir: &'a Path,
        files: &'a HashMap<PathBuf, String>,
        dirs: &'a HashMap<PathBuf, ()>,
    ) -> Vec<DirEntry> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for path in files.keys() {
            if let Ok(rel) = path.strip_prefix(dir) {
                if let Some(first) = rel.components().next() {
                    let child = dir.join(first);
                    if seen.insert(child.clone()) {
                        let kind = if child == *path {
                            EntryKind::File
                        } else {
                            EntryKind::Directory
                        };
                        out.push(DirEntry { path: child, kind });
                    }
                }
            }
        }
        for path in dirs.keys() {
            if let Ok(rel) = path.strip_prefix(dir) {
                if let Some(first) = rel.components().next() {
                    let child = dir.join(first);
                    if seen.insert(child.clone()) {
                        out.push(DirEntry {
                            path: child,
                            kind: EntryKind::Directory,
                        });
                    }
                }
            }
        }
        out
    }
}

#[async_trait]
impl FileSystem for MockFileSystem {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let files = self.files.read().await;
        let contents = files.get(path).cloned().context_not_found(path)?;
        ensure!(
            !is_binary(path, contents.as_bytes()),
            IsBinarySnafu {
                path: path.display().to_string(),
            }
        );
        Ok(contents)
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        self.files
            .write()
            .await
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    async fn make_dir(&self, path: &Path) -> Result<()> {
        self.dirs.write().await.insert(path.to_path_buf(), ());
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<Stat> {
        if let Some(contents) = self.files.read().await.get(path) {
            return Ok(Stat {
                kind: EntryKind::File,
                len: contents.len() as u64,
                modified: None,
            });
        }
        if self.dirs.read().await.contains_key(path) {
            return Ok(Stat {
                kind: EntryKind::Directory,
                len: 0,
                modified: None,
            });
        }
        NotFoundSnafu {
            path: path.display().to_string(),
        }
        .fail()
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let files = self.files.read().await;
        let dirs = self.dirs.read().await;
        Ok(Self::children_of(path, &files, &dirs))
    }

    async fn walk(&self, root: &Path) -> Result<Vec<DirEntry>> {
        let mut stack = vec![root.to_path_buf()];
        let mut out = Vec::new();
        while let Some(dir) = stack.pop() {
            let entries = self.list_dir(&dir).await?;
            for entry in entries {
                if entry.kind == EntryKind::Directory {
                    stack.push(entry.path.clone());
                }
                out.push(entry);
            }
        }
        Ok(out)
    }
}

trait OptionNotFoundExt<T> {
    fn context_not_found(self, path: &Path) -> Result<T>;
}

impl<T> OptionNotFoundExt<T> for Option<T> {
    fn context_not_found(self, path: &Path) -> Result<T> {
        self.ok_or_else(|| error::FsError::NotFound {
            path: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_round_trips_a_file() {
        let fs = MockFileSystem::new();
        fs.write_file(Path::new("/a/b.txt"), "hello").await.unwrap();
        let contents = fs.read_file(Path::new("/a/b.txt")).await.unwrap();
        assert_eq!(contents, "hello");
    }

    #[tokio::test]
    async fn mock_refuses_binary_extension() {
        let fs = MockFileSystem::new();
        fs.write_file(Path::new("/a/logo.png"), "\0\0").await.unwrap();
        let err = fs.read_file(Path::new("/a/logo.png")).await.unwrap_err();
        assert!(matches!(err, FsError::IsBinary { .. }));
    }

    #[tokio::test]
    async fn mock_lists_directory_children() {
        let fs = MockFileSystem::new();
        fs.write_file(Path::new("/a/b.txt"), "x").await.unwrap();
        fs.write_file(Path::new("/a/c/d.txt"), "y").await.unwrap();
        let mut entries = fs.list_dir(Path::new("/a")).await.unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn real_fs_reads_and_writes_a_tempfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let fs = RealFileSystem::new();
        fs.write_file(&path, "hi").await.unwrap();
        assert_eq!(fs.read_file(&path).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn real_fs_lists_dir_through_cache() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), "x").await.unwrap();
        let fs = RealFileSystem::new();
        let first = fs.list_dir(dir.path()).await.unwrap();
        assert_eq!(first.len(), 1);
        tokio::fs::write(dir.path().join("b.txt"), "y").await.unwrap();
        // Not invalidated (no watcher started), so the cache still returns
        // the stale listing within the TTL.
        let second = fs.list_dir(dir.path()).await.unwrap();
        assert_eq!(second.len(), 1);
    }
}
