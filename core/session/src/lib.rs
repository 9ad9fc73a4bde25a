//! Session identity, conversation history, and the per-session ledgers the
//! safety envelope and orchestrator depend on (spec §3, §4.2).
//!
//! [`SessionStore`] is the full aggregate: it owns the [`Session`] identity,
//! the append-only [`Message`] history, the [`FileLedger`], the [`TodoList`],
//! and the [`BackgroundJob`] table. All mutation goes through `&mut` methods
//! guarded by a single [`tokio::sync::RwLock`] so reads can run concurrently
//! and writes are serialized without holding the lock across an `.await`.

mod error;
mod files;
mod job;
mod session;
mod todo;

pub use error::Result;
pub use error::SessionError;
pub use files::FileLedger;
pub use files::ReadRecord;
pub use job::BackgroundJob;
pub use job::JobKind;
pub use job::JobStatus;
pub use session::Session;
pub use session::SCHEMA_VERSION;
pub use todo::TodoItem;
pub use todo::TodoList;

use error::JobAlreadyExistsSnafu;
use error::JobNotFoundSnafu;
use error::SerdeSnafu;
use error::TodoNotFoundSnafu;
use journeyman_protocol::validate_message_sequence;
use journeyman_protocol::Message;
use serde::Deserialize;
use serde::Serialize;
use snafu::ensure;
use snafu::ResultExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// On-disk/on-wire shape of a session (spec §4.2 persistence format).
/// Unknown fields are ignored on load; missing optional fields default, so
/// the schema can grow without breaking old snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub session: Session,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub modified_files: Vec<String>,
    #[serde(default)]
    pub todos: TodoList,
    #[serde(default)]
    pub context_tokens_used: u64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// The full per-session aggregate (spec §3). Cheap to clone (an `Arc`
/// handle); every accessor takes the lock for the minimum span needed.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    session: Session,
    messages: Vec<Message>,
    files: FileLedger,
    todos: TodoList,
    jobs: HashMap<String, BackgroundJob>,
    context_tokens_used: u64,
}

impl SessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                session,
                messages: Vec::new(),
                files: FileLedger::new(),
                todos: TodoList::new(),
                jobs: HashMap::new(),
                context_tokens_used: 0,
            })),
        }
    }

    pub async fn session(&self) -> Session {
        self.inner.read().await.session.clone()
    }

    pub async fn touch(&self) {
        self.inner.write().await.session.touch();
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.inner.write().await.session.set_title(title);
    }

    /// Resets the session's identity (spec §3: "a cleared session
    /// generates a new id"), dropping all conversation and ledger state.
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        guard.session.reset();
        guard.messages.clear();
        guard.files = FileLedger::new();
        guard.todos = TodoList::new();
        guard.jobs.clear();
        guard.context_tokens_used = 0;
    }

    // ---- Messages ----

    /// Appends a message. Rejects appends that would violate the
    /// well-formedness invariant (spec §3, §8) before mutating state.
    pub async fn append(&self, message: Message) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.messages.push(message);
        if let Err(reason) = validate_message_sequence(&guard.messages) {
            guard.messages.pop();
            return error::MalformedSequenceSnafu { reason }.fail();
        }
        guard.session.touch();
        Ok(())
    }

    /// A defensive copy of the conversation (spec §4.2).
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.read().await.messages.clone()
    }

    pub async fn message_count(&self) -> usize {
        self.inner.read().await.messages.len()
    }

    /// Replaces the message history wholesale, used by compaction (spec
    /// §4.9 `Compacting`) to splice a summary in for older turns.
    pub async fn replace_messages(&self, messages: Vec<Message>) -> Result<()> {
        validate_message_sequence(&messages)
            .map_err(|reason| error::MalformedSequenceSnafu { reason }.build())?;
        let mut guard = self.inner.write().await;
        guard.messages = messages;
        Ok(())
    }

    // ---- File ledger ----

    pub async fn track_file_read(&self, path: impl AsRef<Path>, content: &str) {
        let mut guard = self.inner.write().await;
        guard.files.track_read(path.as_ref().to_path_buf(), content);
    }

    pub async fn was_file_read(&self, path: impl AsRef<Path>) -> bool {
        self.inner.read().await.files.was_read(path.as_ref())
    }

    pub async fn is_file_read_fresh(&self, path: impl AsRef<Path>, content: &str) -> bool {
        self.inner.read().await.files.is_fresh(path.as_ref(), content)
    }

    pub async fn mark_file_modified(&self, path: impl AsRef<Path>) {
        let mut guard = self.inner.write().await;
        guard.files.mark_modified(path.as_ref().to_path_buf());
    }

    pub async fn modified_files(&self) -> Vec<std::path::PathBuf> {
        self.inner.read().await.files.modified_files().cloned().collect()
    }

    // ---- Todos ----

    pub async fn add_todo(
        &self,
        id: impl Into<String>,
        text: impl Into<String>,
        parent_id: Option<String>,
    ) -> Result<TodoItem> {
        let mut guard = self.inner.write().await;
        let parent = parent_id.clone();
        let added = guard.todos.add(id, text, parent_id);
        match added {
            Some(item) => Ok(item.clone()),
            None => TodoParentNotFoundSnafu {
                parent_id: parent.unwrap_or_default(),
            }
            .fail(),
        }
    }

    pub async fn check_todo(&self, id: &str, completed: bool) -> Result<()> {
        let mut guard = self.inner.write().await;
        ensure!(guard.todos.set_completed(id, completed), TodoNotFoundSnafu { id });
        Ok(())
    }

    pub async fn delete_todo(&self, id: &str) -> Result<Vec<String>> {
        let mut guard = self.inner.write().await;
        ensure!(guard.todos.get(id).is_some(), TodoNotFoundSnafu { id });
        Ok(guard.todos.delete(id))
    }

    pub async fn todos(&self) -> TodoList {
        self.inner.read().await.todos.clone()
    }

    // ---- Background jobs ----

    pub async fn add_background_job(&self, job: BackgroundJob) -> Result<()> {
        let mut guard = self.inner.write().await;
        ensure!(!guard.jobs.contains_key(&job.id), JobAlreadyExistsSnafu { id: job.id.clone() });
        guard.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    pub async fn get_background_job(&self, id: &str) -> Result<BackgroundJob> {
        let guard = self.inner.read().await;
        guard.jobs.get(id).cloned().context(JobNotFoundSnafu { id })
    }

    pub async fn update_background_job<F>(&self, id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut BackgroundJob),
    {
        let mut guard = self.inner.write().await;
        let job = guard.jobs.get_mut(id).context(JobNotFoundSnafu { id })?;
        update(job);
        Ok(())
    }

    pub async fn list_background_jobs(&self) -> Vec<BackgroundJob> {
        self.inner.read().await.jobs.values().cloned().collect()
    }

    // ---- Context usage ----

    pub async fn set_context_tokens_used(&self, tokens: u64) {
        self.inner.write().await.context_tokens_used = tokens;
    }

    pub async fn context_tokens_used(&self) -> u64 {
        self.inner.read().await.context_tokens_used
    }

    // ---- Persistence ----

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.read().await;
        SessionSnapshot {
            schema_version: SCHEMA_VERSION,
            session: guard.session.clone(),
            messages: guard.messages.clone(),
            modified_files: guard
                .files
                .modified_files()
                .map(|p| p.display().to_string())
                .collect(),
            todos: guard.todos.clone(),
            context_tokens_used: guard.context_tokens_used,
        }
    }

    pub async fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.snapshot().await).context(SerdeSnafu)
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let mut files = FileLedger::new();
        for path in &snapshot.modified_files {
            files.mark_modified(std::path::PathBuf::from(path));
        }
        Self {
            inner: Arc::new(RwLock::new(Inner {
                session: snapshot.session,
                messages: snapshot.messages,
                files,
                todos: snapshot.todos,
                jobs: HashMap::new(),
                context_tokens_used: snapshot.context_tokens_used,
            })),
        }
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let snapshot: SessionSnapshot = serde_json::from_str(data).context(SerdeSnafu)?;
        Ok(Self::from_snapshot(snapshot))
    }
}

use error::TodoParentNotFoundSnafu;
use snafu::OptionExt;

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Session::new("/tmp/project"))
    }

    #[tokio::test]
    async fn append_enforces_well_formed_sequence() {
        let store = store();
        store.append(Message::user("hi")).await.expect("user append");
        let err = store
            .append(Message::tool_reply("c1", "read_file", "x", false))
            .await;
        assert!(err.is_err());
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn round_trip_is_lossless_on_observable_fields() {
        let store = store();
        store.append(Message::user("fix the bug")).await.expect("append");
        store.track_file_read("a.rs", "fn main() {}").await;
        store.mark_file_modified("a.rs").await;
        store.add_todo("t1", "write tests", None).await.expect("add todo");

        let json = store.to_json().await.expect("serialize");
        let restored = SessionStore::from_json(&json).expect("deserialize");
        let json2 = restored.to_json().await.expect("serialize again");
        assert_eq!(json, json2);
        assert_eq!(restored.messages().await.len(), 1);
        assert_eq!(restored.modified_files().await.len(), 1);
        assert_eq!(restored.todos().await.items().len(), 1);
    }

    #[tokio::test]
    async fn clear_generates_a_fresh_session_id() {
        let store = store();
        store.append(Message::user("hi")).await.expect("append");
        let old_id = store.session().await.id;
        store.clear().await;
        assert_ne!(store.session().await.id, old_id);
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn background_job_lifecycle() {
        let store = store();
        store
            .add_background_job(BackgroundJob::new("j1", "sleep 1", JobKind::Shell))
            .await
            .expect("add");
        assert!(store
            .add_background_job(BackgroundJob::new("j1", "sleep 1", JobKind::Shell))
            .await
            .is_err());
        store
            .update_background_job("j1", |job| job.complete(0))
            .await
            .expect("update");
        let job = store.get_background_job("j1").await.expect("get");
        assert!(job.is_done());
    }

    #[tokio::test]
    async fn todo_delete_cascades_through_the_store() {
        let store = store();
        store.add_todo("root", "root", None).await.expect("add root");
        store
            .add_todo("child", "child", Some("root".to_string()))
            .await
            .expect("add child");
        let deleted = store.delete_todo("root").await.expect("delete");
        assert_eq!(deleted.len(), 2);
        assert!(store.todos().await.items().is_empty());
    }
}
