//! Session identity and metadata (spec §3 `Session`).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Schema version for [`crate::SessionSnapshot`] persistence, bumped
/// whenever the on-disk shape changes incompatibly (spec §4.2 persistence format).
pub const SCHEMA_VERSION: u32 = 1;

/// Session identity and lifecycle metadata. Owns no conversation state
/// itself; see [`crate::SessionStore`] for the full aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub working_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub ephemeral: bool,
}

impl Session {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), working_dir)
    }

    pub fn with_id(id: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            last_activity_at: now,
            working_dir: working_dir.into(),
            title: None,
            ephemeral: false,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_ephemeral(&mut self, ephemeral: bool) {
        self.ephemeral = ephemeral;
    }

    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }

    pub fn idle_secs(&self) -> i64 {
        (Utc::now() - self.last_activity_at).num_seconds()
    }

    /// Resets identity for a cleared session: spec.md requires a fresh id,
    /// timestamps, and an empty title, while keeping the working directory.
    pub fn reset(&mut self) {
        let now = Utc::now();
        self.id = uuid::Uuid::new_v4().to_string();
        self.created_at = now;
        self.last_activity_at = now;
        self.title = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_fresh_id_and_timestamps() {
        let session = Session::new("/tmp/project");
        assert!(!session.id.is_empty());
        assert_eq!(session.created_at, session.last_activity_at);
        assert!(!session.ephemeral);
    }

    #[test]
    fn reset_generates_a_new_id() {
        let mut session = Session::new("/tmp/project");
        let old_id = session.id.clone();
        session.set_title("before reset");
        session.reset();
        assert_ne!(session.id, old_id);
        assert!(session.title.is_none());
    }
}
