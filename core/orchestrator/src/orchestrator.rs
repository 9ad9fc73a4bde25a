//! The orchestrator state machine (spec §4.9): `Idle -> AssemblingPrompt ->
//! CallingLLM -> (Streaming|AuthorizingTools|JudgingError) -> ExecutingTools
//! -> CallingLLM`, looping until the model stops requesting tools, with
//! `Compacting` and `Verification` sub-states and `Cancelling` reachable
//! from every suspension point.
//!
//! Grounded on the teacher's `core/loop/src/driver.rs` `AgentLoop::run` /
//! `core_message_loop`: a struct holding the model, tool registry, and
//! conversation state, driving a single `run`-style entry point that loops
//! calling-model/dispatching-tools until a terminal condition is reached.

use crate::compaction;
use crate::error::Result;
use crate::error::SessionSnafu;
use crate::prompt;
use crate::prompt::PromptContext;
use crate::result::TurnOutcome;
use crate::verification;
use crate::OrchestratorConfig;
use journeyman_error::WithStatusCode;
use journeyman_inference::CompletionRequest;
use journeyman_inference::CompletionResponse;
use journeyman_inference::FinishReason;
use journeyman_inference::IdentityNormalizer;
use journeyman_inference::Model;
use journeyman_inference::NormalizeMessages;
use journeyman_inference::StreamDelta;
use journeyman_error_judge::ErrorJudge;
use journeyman_protocol::ContextModifier;
use journeyman_protocol::LoopEvent;
use journeyman_protocol::Message;
use journeyman_protocol::ToolCall;
use journeyman_safety::Authorizer;
use journeyman_safety::PermissionGate;
use journeyman_session::SessionStore;
use journeyman_summarizer::SummarizerConfig;
use journeyman_tools::dispatch_calls;
use journeyman_tools::DispatchResult;
use journeyman_tools::ToolContext;
use journeyman_tools::ToolRegistry;
use serde_json::Value;
use snafu::ResultExt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Field names tools conventionally use for a path argument, checked in
/// order. Best-effort: a tool whose schema uses something else just means
/// the authorizer sees `path: None` and decides on tool name alone.
const PATH_ARG_NAMES: &[&str] = &["path", "file_path"];

fn extract_path_arg(arguments: &Value) -> Option<PathBuf> {
    for name in PATH_ARG_NAMES {
        if let Some(s) = arguments.get(name).and_then(Value::as_str) {
            return Some(PathBuf::from(s));
        }
    }
    None
}

/// Drives one session's conversation loop against a [`Model`], a
/// [`ToolRegistry`], and the safety envelope's [`PermissionGate`].
///
/// Cheap to construct per session; every collaborator is an `Arc` handle or
/// a cheaply-cloneable store, mirroring [`journeyman_tools::ToolContext`].
pub struct Orchestrator {
    model: Arc<dyn Model>,
    registry: Arc<ToolRegistry>,
    session: SessionStore,
    base_ctx: ToolContext,
    permission_gate: Arc<PermissionGate>,
    error_judge: ErrorJudge,
    normalizer: Box<dyn NormalizeMessages>,
    config: OrchestratorConfig,
    summarizer_config: SummarizerConfig,
    event_tx: mpsc::Sender<LoopEvent>,
    cancel_token: CancellationToken,
    working_dir: PathBuf,
    active_constraints: Vec<String>,
    context_window: u32,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model: Arc<dyn Model>,
        registry: Arc<ToolRegistry>,
        session: SessionStore,
        base_ctx: ToolContext,
        permission_gate: Arc<PermissionGate>,
        error_judge: ErrorJudge,
        event_tx: mpsc::Sender<LoopEvent>,
        cancel_token: CancellationToken,
        working_dir: impl Into<PathBuf>,
        context_window: u32,
    ) -> Self {
        Self {
            model,
            registry,
            session,
            base_ctx,
            permission_gate,
            error_judge,
            normalizer: Box::new(IdentityNormalizer),
            config: OrchestratorConfig::default(),
            summarizer_config: SummarizerConfig::default(),
            event_tx,
            cancel_token,
            working_dir: working_dir.into(),
            active_constraints: Vec::new(),
            context_window,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_summarizer_config(mut self, config: SummarizerConfig) -> Self {
        self.summarizer_config = config;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn NormalizeMessages>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_active_constraints(mut self, constraints: Vec<String>) -> Self {
        self.active_constraints = constraints;
        self
    }

    /// Drives one user prompt to a terminal [`TurnOutcome`].
    pub async fn run_turn(&mut self, user_prompt: &str) -> Result<TurnOutcome> {
        self.session.append(Message::user(user_prompt)).await.context(SessionSnafu)?;

        let mut turns: u32 = 0;
        let mut verification_ran = false;

        loop {
            if self.cancel_token.is_cancelled() {
                return Ok(self.cancel_turn(turns).await);
            }

            if let Some(max_turns) = self.config.max_turns {
                if turns >= max_turns {
                    let usage = self.usage_so_far().await;
                    self.emit(LoopEvent::TurnFinished { turn: turns }).await;
                    return Ok(TurnOutcome::MaxTurnsReached { turns, usage });
                }
            }

            turns += 1;
            self.emit(LoopEvent::TurnStarted { turn: turns }).await;

            let response = match self.call_model_with_retries(turns).await? {
                CallOutcome::Response(response) => response,
                CallOutcome::Halted { reason } => return Ok(TurnOutcome::Failed { reason, turns }),
                CallOutcome::Cancelled => return Ok(self.cancel_turn(turns).await),
            };

            self.session.set_context_tokens_used(response.usage.total()).await;

            if !response.has_tool_calls() {
                self.session.append(Message::assistant(response.content.clone())).await.context(SessionSnafu)?;
                self.emit(LoopEvent::TurnFinished { turn: turns }).await;

                let verification = if self.config.verification_enabled && !verification_ran {
                    verification_ran = true;
                    Some(self.run_verification().await?)
                } else {
                    None
                };

                return Ok(TurnOutcome::Completed {
                    text: response.content,
                    turns,
                    usage: self.usage_so_far().await,
                    verification,
                });
            }

            self.session
                .append(Message::assistant_with_tool_calls(response.content, response.tool_calls.clone()))
                .await
                .context(SessionSnafu)?;

            match self.authorize_and_execute(&response.tool_calls).await? {
                ExecutionOutcome::AllDenied { reasons } => {
                    self.emit(LoopEvent::TurnFinished { turn: turns }).await;
                    return Ok(TurnOutcome::ReportDenied { reasons });
                }
                ExecutionOutcome::Continue => {
                    self.emit(LoopEvent::TurnFinished { turn: turns }).await;
                }
                ExecutionOutcome::Cancelled => return Ok(self.cancel_turn(turns).await),
            }
        }
    }

    async fn usage_so_far(&self) -> journeyman_protocol::TokenUsage {
        journeyman_protocol::TokenUsage {
            input_tokens: self.session.context_tokens_used().await,
            output_tokens: 0,
            cached_input_tokens: 0,
        }
    }

    async fn cancel_turn(&self, turns: u32) -> TurnOutcome {
        let _ = self.session.append(Message::system("Generation stopped")).await;
        self.emit(LoopEvent::TurnFinished { turn: turns }).await;
        TurnOutcome::Cancelled { turns }
    }

    async fn emit(&self, event: LoopEvent) {
        let _ = self.event_tx.send(event).await;
    }

    /// `AssemblingPrompt` + `CallingLLM`/`Streaming`, retried through
    /// `JudgingError` until the judge says halt or `max_retry_attempts` is
    /// exhausted.
    async fn call_model_with_retries(&mut self, turn: u32) -> Result<CallOutcome> {
        let mut attempt: u32 = 1;
        loop {
            let messages = self.session.messages().await;
            let tools = self.registry.definitions();
            let ctx = PromptContext {
                working_dir: &self.working_dir,
                tools: &tools,
                active_constraints: &self.active_constraints,
                usage: self.usage_so_far().await,
                context_window: self.context_window,
            };
            let request = CompletionRequest::new(prompt::assemble_messages(&ctx, messages, self.normalizer.as_ref())).with_tools(tools);

            debug!(turn, attempt, "calling model");
            match self.stream_completion(request).await {
                Ok(StreamOutcome::Response(response)) => return Ok(CallOutcome::Response(response)),
                Ok(StreamOutcome::Cancelled) => return Ok(CallOutcome::Cancelled),
                Err(err) => {
                    let status = err.status_code();
                    let decision = self.error_judge.judge(status, &err.to_string(), attempt).await;
                    warn!(turn, attempt, reason = %decision.reason, "calling model failed");
                    self.emit(LoopEvent::Error { message: decision.reason.clone() }).await;

                    if !decision.should_retry {
                        return Ok(CallOutcome::Halted { reason: decision.reason });
                    }

                    if decision.trigger_compaction {
                        self.emit(LoopEvent::Compacting).await;
                        let messages = self.session.messages().await;
                        let compacted = compaction::compact(self.model.as_ref(), messages, self.config.compaction_keep_turns, &self.summarizer_config).await?;
                        self.session.replace_messages(compacted).await.context(SessionSnafu)?;
                    }

                    let sleep = std::time::Duration::from_secs(decision.sleep_seconds).min(self.config.retry_sleep_cap);
                    tokio::select! {
                        _ = tokio::time::sleep(sleep) => {}
                        _ = self.cancel_token.cancelled() => return Ok(CallOutcome::Cancelled),
                    }

                    attempt = (attempt + 1).min(self.config.max_retry_attempts);
                }
            }
        }
    }

    /// Drains a streaming completion into one [`CompletionResponse`],
    /// forwarding text deltas as [`LoopEvent::AssistantTextDelta`] and
    /// bailing out early if cancellation fires mid-stream.
    async fn stream_completion(&self, request: CompletionRequest) -> journeyman_inference::Result<StreamOutcome> {
        let mut rx = self.model.stream(request).await?;
        let mut content = String::new();
        let mut tool_calls = Vec::new();
        let mut finish_reason = FinishReason::Stop;
        let mut usage = journeyman_protocol::TokenUsage::default();

        loop {
            tokio::select! {
                delta = rx.recv() => {
                    match delta {
                        Some(StreamDelta::TextDelta(text)) => {
                            self.emit(LoopEvent::AssistantTextDelta { text: text.clone() }).await;
                            content.push_str(&text);
                        }
                        Some(StreamDelta::ToolCallDelta(call)) => tool_calls.push(call),
                        Some(StreamDelta::Finished { finish_reason: fr, usage: u }) => {
                            finish_reason = fr;
                            usage = u;
                        }
                        None => break,
                    }
                }
                _ = self.cancel_token.cancelled() => return Ok(StreamOutcome::Cancelled),
            }
        }

        Ok(StreamOutcome::Response(CompletionResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        }))
    }

    /// `AuthorizingTools` -> `ExecutingTools`: consults the permission gate
    /// for every Elevated/Sensitive call, appends a synthetic denial reply
    /// for anything refused, then dispatches the rest.
    async fn authorize_and_execute(&self, calls: &[ToolCall]) -> Result<ExecutionOutcome> {
        let mut allowed: Vec<ToolCall> = Vec::new();
        let mut denied_reasons: Vec<String> = Vec::new();
        let mut denial_by_id: std::collections::HashMap<&str, String> = std::collections::HashMap::new();

        for call in calls {
            if self.cancel_token.is_cancelled() {
                return Ok(ExecutionOutcome::Cancelled);
            }

            let (tier, description) = match self.registry.get(&call.name) {
                Ok(tool) => (tool.authorization_tier(), tool.description().to_string()),
                Err(_) => (journeyman_protocol::AuthorizationTier::Safe, format!("call to unregistered tool {}", call.name)),
            };
            let path = extract_path_arg(&call.arguments);

            let decision = self.permission_gate.check(tier, &call.name, path.as_deref(), &description).await;
            if !decision.permits_execution() {
                let reason = match &decision {
                    journeyman_protocol::PermissionDecision::Denied { reason } => reason.clone(),
                    _ => unreachable!("permits_execution() false implies Denied"),
                };
                self.emit(LoopEvent::ToolCallStarted { call_id: call.id.clone(), tool_name: call.name.clone() }).await;
                self.emit(LoopEvent::ToolCallFinished { call_id: call.id.clone(), is_error: true }).await;
                denied_reasons.push(reason.clone());
                denial_by_id.insert(call.id.as_str(), reason);
            } else {
                allowed.push(call.clone());
            }
        }

        if allowed.is_empty() {
            for call in calls {
                if let Some(reason) = denial_by_id.get(call.id.as_str()) {
                    let reply = Message::tool_reply(&call.id, &call.name, format!("authorization denied: {reason}"), true);
                    self.session.append(reply).await.context(SessionSnafu)?;
                }
            }
            return Ok(ExecutionOutcome::AllDenied { reasons: denied_reasons });
        }

        for call in &allowed {
            self.emit(LoopEvent::ToolCallStarted { call_id: call.id.clone(), tool_name: call.name.clone() }).await;
        }

        let batch_token = self.cancel_token.child_token();
        let timeout_token = batch_token.clone();
        let timeout = self.config.tool_timeout;
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => timeout_token.cancel(),
                _ = timeout_token.cancelled() => {}
            }
        });

        let mut ctx = self.base_ctx.clone();
        ctx.cancel_token = batch_token;
        let results = dispatch_calls(&self.registry, &allowed, &ctx).await;
        timer.abort();

        let results_by_id: std::collections::HashMap<&str, &DispatchResult> = results.iter().map(|r| (r.call_id.as_str(), r)).collect();

        for call in calls {
            if let Some(reason) = denial_by_id.get(call.id.as_str()) {
                let reply = Message::tool_reply(&call.id, &call.name, format!("authorization denied: {reason}"), true);
                self.session.append(reply).await.context(SessionSnafu)?;
                continue;
            }
            if let Some(result) = results_by_id.get(call.id.as_str()) {
                self.apply_modifiers(&result.output.modifiers).await?;
                let text = result.output.content.as_message_text();
                self.session
                    .append(Message::tool_reply(&call.id, &call.name, text, result.output.is_error))
                    .await
                    .context(SessionSnafu)?;
                self.emit(LoopEvent::ToolCallFinished { call_id: call.id.clone(), is_error: result.output.is_error }).await;
            }
        }

        Ok(ExecutionOutcome::Continue)
    }

    async fn apply_modifiers(&self, modifiers: &[ContextModifier]) -> Result<()> {
        for modifier in modifiers {
            match modifier {
                ContextModifier::FileRead { path, content } => {
                    self.session.track_file_read(path, content).await;
                }
                ContextModifier::FileModified { path } => {
                    self.session.mark_file_modified(path).await;
                }
                ContextModifier::TodoChanged => {}
            }
        }
        Ok(())
    }

    /// `Verification` (spec §4.9): one advisory, tool-free re-entry after a
    /// clean `Stop` completion.
    async fn run_verification(&self) -> Result<String> {
        self.emit(LoopEvent::Verifying).await;
        let modified_files = self.session.modified_files().await;
        let pending_todos: Vec<String> = self
            .session
            .todos()
            .await
            .items()
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.text.clone())
            .collect();

        match verification::run_verification(self.model.as_ref(), &modified_files, &pending_todos).await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                info!(error = %err, "verification pass failed, treating as advisory no-op");
                Ok(format!("verification unavailable: {err}"))
            }
        }
    }
}

enum CallOutcome {
    Response(CompletionResponse),
    Halted { reason: String },
    Cancelled,
}

enum StreamOutcome {
    Response(CompletionResponse),
    Cancelled,
}

enum ExecutionOutcome {
    Continue,
    AllDenied { reasons: Vec<String> },
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_fs::MockFileSystem;
    use journeyman_inference::CompletionResponse as Response;
    use journeyman_inference::MockModel;
    use journeyman_safety::PermissionRuleEvaluator;
    use journeyman_safety::TimeoutDenyAuthorizer;
    use journeyman_session::Session;
    use journeyman_shell::BackgroundController;
    use journeyman_shell::ShellExecutor;
    use journeyman_tools::ToolContext;

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::new())
    }

    fn store() -> SessionStore {
        SessionStore::new(Session::new("/workspace/project"))
    }

    fn base_ctx(session: SessionStore) -> ToolContext {
        ToolContext::new(
            "base",
            "session-1",
            "/workspace/project",
            session,
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        )
    }

    fn gate() -> Arc<PermissionGate> {
        Arc::new(PermissionGate::new(PermissionRuleEvaluator::new(), Box::new(TimeoutDenyAuthorizer::default())))
    }

    fn orchestrator(model: Arc<dyn Model>) -> Orchestrator {
        let session = store();
        let (tx, _rx) = mpsc::channel(32);
        Orchestrator::new(
            model,
            registry(),
            session.clone(),
            base_ctx(session),
            gate(),
            ErrorJudge::new(6),
            tx,
            CancellationToken::new(),
            "/workspace/project",
            128_000,
        )
        .with_config(OrchestratorConfig {
            verification_enabled: false,
            ..OrchestratorConfig::default()
        })
    }

    #[tokio::test]
    async fn a_clean_stop_completion_ends_the_turn() {
        let model = Arc::new(MockModel::always_text("mock", "all done"));
        let mut orch = orchestrator(model);
        let outcome = orch.run_turn("fix the bug").await.expect("run_turn");
        match outcome {
            TurnOutcome::Completed { text, turns, .. } => {
                assert_eq!(text, "all done");
                assert_eq!(turns, 1);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_calls_to_an_unregistered_tool_surface_as_an_error_reply_then_stop() {
        let responses = vec![
            Response {
                content: String::new(),
                tool_calls: vec![ToolCall::new("c1", "does_not_exist", serde_json::json!({}))],
                finish_reason: FinishReason::ToolCalls,
                usage: journeyman_protocol::TokenUsage::default(),
            },
            Response {
                content: "handled the error".to_string(),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: journeyman_protocol::TokenUsage::default(),
            },
        ];
        let model = Arc::new(MockModel::new("mock", responses));
        let mut orch = orchestrator(model);
        let outcome = orch.run_turn("do something").await.expect("run_turn");
        match outcome {
            TurnOutcome::Completed { turns, .. } => assert_eq!(turns, 2),
            other => panic!("expected Completed after the second turn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelling_before_the_first_call_ends_the_turn_as_cancelled() {
        let model = Arc::new(MockModel::always_text("mock", "unused"));
        let mut orch = orchestrator(model);
        orch.cancel_token.cancel();
        let outcome = orch.run_turn("fix the bug").await.expect("run_turn");
        assert!(matches!(outcome, TurnOutcome::Cancelled { .. }));
    }

    #[tokio::test]
    async fn max_turns_of_zero_reports_max_turns_reached_without_calling_the_model() {
        let model = Arc::new(MockModel::new("mock", Vec::new()));
        let mut orch = orchestrator(model).with_config(OrchestratorConfig {
            max_turns: Some(0),
            verification_enabled: false,
            ..OrchestratorConfig::default()
        });
        let outcome = orch.run_turn("fix the bug").await.expect("run_turn");
        assert!(matches!(outcome, TurnOutcome::MaxTurnsReached { turns: 0, .. }));
    }
}
