//! Read-before-write enforcement (spec §4.4.1): a write-class tool may only
//! mutate a file the session has already read, and content-digest tracking
//! lets callers detect drift against the version that was read.

use crate::error::ReadRequiredSnafu;
use crate::error::Result;
use crate::error::StaleReadSnafu;
use journeyman_fs::FileSystem;
use journeyman_session::SessionStore;
use snafu::ensure;
use std::path::Path;

/// Checks that `path` may be written: either it does not exist yet (a
/// create), or it was read in this session and the on-disk content still
/// matches the digest recorded at read time.
pub async fn enforce_read_before_write(
    store: &SessionStore,
    fs: &dyn FileSystem,
    path: &Path,
    strict: bool,
) -> Result<()> {
    let exists = fs.stat(path).await.is_ok();
    if !exists {
        return Ok(());
    }

    let was_read = store.was_file_read(path).await;
    ensure!(
        was_read,
        ReadRequiredSnafu {
            path: path.display().to_string(),
        }
    );

    if strict {
        if let Ok(contents) = fs.read_file(path).await {
            let fresh = store.is_file_read_fresh(path, &contents).await;
            ensure!(
                fresh,
                StaleReadSnafu {
                    path: path.display().to_string(),
                }
            );
        }
    }

    Ok(())
}

/// Records a newly created file as read, so a subsequent diff against it is
/// permitted without re-reading.
pub async fn record_create(store: &SessionStore, path: &Path, contents: &str) {
    store.track_file_read(path, contents).await;
    store.mark_file_modified(path).await;
}

/// Records a successful write, marking the path modified and refreshing the
/// read digest to the content just written.
pub async fn record_write(store: &SessionStore, path: &Path, contents: &str) {
    store.track_file_read(path, contents).await;
    store.mark_file_modified(path).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_fs::MockFileSystem;
    use journeyman_session::Session;

    #[tokio::test]
    async fn new_file_is_exempt_from_read_before_write() {
        let store = SessionStore::new(Session::new("/tmp"));
        let fs = MockFileSystem::new();
        assert!(
            enforce_read_before_write(&store, &fs, Path::new("/tmp/new.txt"), false)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn existing_unread_file_is_rejected() {
        let store = SessionStore::new(Session::new("/tmp"));
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "hello").await;
        let err = enforce_read_before_write(&store, &fs, Path::new("/tmp/a.txt"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::SafetyError::ReadRequired { .. }));
    }

    #[tokio::test]
    async fn read_then_write_is_allowed() {
        let store = SessionStore::new(Session::new("/tmp"));
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "hello").await;
        store.track_file_read("/tmp/a.txt", "hello").await;
        assert!(
            enforce_read_before_write(&store, &fs, Path::new("/tmp/a.txt"), false)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn strict_mode_detects_drift() {
        let store = SessionStore::new(Session::new("/tmp"));
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "hello").await;
        store.track_file_read("/tmp/a.txt", "hello").await;
        fs.write_file(Path::new("/tmp/a.txt"), "changed externally")
            .await
            .unwrap();
        let err = enforce_read_before_write(&store, &fs, Path::new("/tmp/a.txt"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::SafetyError::StaleRead { .. }));
    }
}
