//! Tool execution context (spec §4.5): everything a [`crate::Tool`] needs
//! to read/write the session, touch the filesystem, run shell commands and
//! background jobs, and run sandboxed wasm modules.

use journeyman_fs::FileSystem;
use journeyman_inference::Model;
use journeyman_protocol::LoopEvent;
use journeyman_protocol::ToolProgressInfo;
use journeyman_sandbox::SandboxPolicy;
use journeyman_sandbox::WasmExecutor;
use journeyman_session::SessionStore;
use journeyman_shell::BackgroundController;
use journeyman_shell::ShellExecutor;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::asker::UserAsker;
use crate::registry::ToolRegistry;

/// Context for one tool execution. Cheap to clone: every field is an `Arc`
/// handle or plain data, never a lock held across calls.
#[derive(Clone)]
pub struct ToolContext {
    pub call_id: String,
    pub session_id: String,
    pub cwd: PathBuf,
    pub session: SessionStore,
    pub fs: Arc<dyn FileSystem>,
    pub shell: ShellExecutor,
    pub background: BackgroundController,
    pub sandbox_policy: SandboxPolicy,
    pub wasm_executor: Option<Arc<WasmExecutor>>,
    /// Model used for `read_file_summarized` and other in-tool condensation;
    /// unset in contexts that never need it (kept optional to avoid forcing
    /// every caller to provide one).
    pub summarizer_model: Option<Arc<dyn Model>>,
    /// Read-before-write is advisory unless the workspace config opts into
    /// strict enforcement (spec §4.4, DESIGN.md open question §9).
    pub strict_read_ledger: bool,
    pub event_tx: Option<mpsc::Sender<LoopEvent>>,
    pub cancel_token: CancellationToken,
    /// Back-reference so `parallel_tool_execution` can dispatch sub-calls
    /// through the same registry that is running it.
    pub registry: Option<Arc<ToolRegistry>>,
    /// `ask_user`'s round-trip to the frontend; unset in contexts that
    /// never need it (mirrors `summarizer_model`'s optionality).
    pub asker: Option<Arc<dyn UserAsker>>,
}

impl ToolContext {
    pub fn new(
        call_id: impl Into<String>,
        session_id: impl Into<String>,
        cwd: impl Into<PathBuf>,
        session: SessionStore,
        fs: Arc<dyn FileSystem>,
        shell: ShellExecutor,
        background: BackgroundController,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            session_id: session_id.into(),
            cwd: cwd.into(),
            session,
            fs,
            shell,
            background,
            sandbox_policy: SandboxPolicy::default(),
            wasm_executor: None,
            summarizer_model: None,
            strict_read_ledger: false,
            event_tx: None,
            cancel_token: CancellationToken::new(),
            registry: None,
            asker: None,
        }
    }

    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_sandbox(mut self, policy: SandboxPolicy, executor: Arc<WasmExecutor>) -> Self {
        self.sandbox_policy = policy;
        self.wasm_executor = Some(executor);
        self
    }

    pub fn with_summarizer_model(mut self, model: Arc<dyn Model>) -> Self {
        self.summarizer_model = Some(model);
        self
    }

    pub fn with_strict_read_ledger(mut self, strict: bool) -> Self {
        self.strict_read_ledger = strict;
        self
    }

    pub fn with_event_tx(mut self, tx: mpsc::Sender<LoopEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_asker(mut self, asker: Arc<dyn UserAsker>) -> Self {
        self.asker = Some(asker);
        self
    }

    pub async fn emit(&self, event: LoopEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    pub async fn emit_progress(&self, message: impl Into<String>) {
        self.emit(LoopEvent::ToolProgress(ToolProgressInfo {
            call_id: self.call_id.clone(),
            message: message.into(),
            percent: None,
        }))
        .await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await
    }

    /// Resolves `path` relative to the working directory, leaving absolute
    /// paths untouched.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.cwd.join(candidate)
        }
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("call_id", &self.call_id)
            .field("session_id", &self.session_id)
            .field("cwd", &self.cwd)
            .field("is_cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_fs::MockFileSystem;
    use journeyman_session::Session;

    fn ctx() -> ToolContext {
        ToolContext::new(
            "call-1",
            "session-1",
            "/home/user/project",
            SessionStore::new(Session::new("/home/user/project")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        )
    }

    #[test]
    fn resolve_path_joins_relative_paths_against_cwd() {
        let ctx = ctx();
        assert_eq!(ctx.resolve_path("src/main.rs"), PathBuf::from("/home/user/project/src/main.rs"));
        assert_eq!(ctx.resolve_path("/etc/passwd"), PathBuf::from("/etc/passwd"));
    }

    #[tokio::test]
    async fn fresh_context_is_not_cancelled() {
        let ctx = ctx();
        assert!(!ctx.is_cancelled());
    }
}
