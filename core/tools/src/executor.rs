//! Tool pipeline execution and §4.7 parallel dispatch.
//!
//! [`run_one`] drives a single tool through its 5-stage pipeline, turning
//! every failure mode (validation, permission, execution error) into a
//! [`ToolOutput`] the orchestrator can fold straight back into the
//! conversation as a tool message. [`dispatch_calls`] groups a batch of
//! calls by [`ConcurrencySafety`]: `Safe` calls run concurrently via
//! `futures::future::join_all`, `Unsafe` calls run one at a time in the
//! order given. Either way, each call id keeps its own result so the
//! orchestrator can emit replies in the assistant's declared order.

use crate::registry::ToolRegistry;
use crate::tool::Tool;
use crate::ToolContext;
use journeyman_protocol::ConcurrencySafety;
use journeyman_protocol::PermissionResult;
use journeyman_protocol::ToolCall;
use journeyman_protocol::ToolOutput;
use journeyman_protocol::ValidationResult;
use std::sync::Arc;

/// Result of one tool call, keyed by the call id the assistant declared.
pub struct DispatchResult {
    pub call_id: String,
    pub output: ToolOutput,
}

/// Runs `tool` through validate → check_permission → execute →
/// post_process → cleanup, converting every early exit into an error
/// [`ToolOutput`] rather than a `Result`, so a failed sub-call never aborts
/// the rest of a batch.
pub async fn run_one(tool: &dyn Tool, input: serde_json::Value, ctx: &mut ToolContext) -> ToolOutput {
    if let ValidationResult::Invalid { errors } = tool.validate(&input).await {
        let message = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        tool.cleanup(ctx).await;
        return ToolOutput::error(format!("invalid input: {message}"));
    }

    match tool.check_permission(&input, ctx).await {
        PermissionResult::Denied { reason } => {
            tool.cleanup(ctx).await;
            return ToolOutput::error(format!("permission denied: {reason}"));
        }
        PermissionResult::NeedsApproval { request } => {
            tool.cleanup(ctx).await;
            return ToolOutput::error(format!("approval required: {}", request.description));
        }
        PermissionResult::Allowed => {}
    }

    if ctx.is_cancelled() {
        tool.cleanup(ctx).await;
        return ToolOutput::error("cancelled");
    }

    let output = match tool.execute(input, ctx).await {
        Ok(output) => tool.post_process(output, ctx).await,
        Err(err) => ToolOutput::error(err.to_string()),
    };
    tool.cleanup(ctx).await;
    output
}

/// Dispatches a batch of calls against `registry`, splitting `Safe` tools
/// into one concurrent wave and running `Unsafe` tools sequentially
/// afterward, so writers never race each other (spec §4.7). Unknown tool
/// names produce an error result rather than aborting the batch. Each call
/// gets its own cloned [`ToolContext`] (cheap: every field is an `Arc`
/// handle or plain data) stamped with its own call id.
pub async fn dispatch_calls(registry: &ToolRegistry, calls: &[ToolCall], base_ctx: &ToolContext) -> Vec<DispatchResult> {
    let mut safe = Vec::new();
    let mut unsafe_calls = Vec::new();

    for call in calls {
        match registry.get(&call.name) {
            Ok(tool) => {
                if tool.is_concurrent_safe() {
                    safe.push((call, tool));
                } else {
                    unsafe_calls.push((call, tool));
                }
            }
            Err(_) => {
                safe.push((call, Arc::new(MissingTool { name: call.name.clone() }) as Arc<dyn Tool>));
            }
        }
    }

    let mut results = Vec::with_capacity(calls.len());

    let safe_futures = safe.into_iter().map(|(call, tool)| {
        let mut ctx = base_ctx.clone();
        ctx.call_id = call.id.clone();
        let input = call.arguments.clone();
        let call_id = call.id.clone();
        async move {
            let output = run_one(tool.as_ref(), input, &mut ctx).await;
            DispatchResult { call_id, output }
        }
    });
    results.extend(futures::future::join_all(safe_futures).await);

    for (call, tool) in unsafe_calls {
        let mut ctx = base_ctx.clone();
        ctx.call_id = call.id.clone();
        let output = run_one(tool.as_ref(), call.arguments.clone(), &mut ctx).await;
        results.push(DispatchResult {
            call_id: call.id.clone(),
            output,
        });
    }

    let order: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
    results.sort_by_key(|r| order.iter().position(|id| *id == r.call_id).unwrap_or(usize::MAX));
    results
}

struct MissingTool {
    name: String,
}

#[async_trait::async_trait]
impl Tool for MissingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "unregistered tool"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, _input: serde_json::Value, _ctx: &mut ToolContext) -> Result<ToolOutput, crate::error::ToolError> {
        Err(crate::error::ToolError::NotFound { name: self.name.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ToolContext;
    use async_trait::async_trait;
    use journeyman_fs::MockFileSystem;
    use journeyman_session::Session;
    use journeyman_session::SessionStore;
    use journeyman_shell::BackgroundController;
    use journeyman_shell::ShellExecutor;

    struct SafeEcho;

    #[async_trait]
    impl Tool for SafeEcho {
        fn name(&self) -> &str {
            "safe_echo"
        }
        fn description(&self) -> &str {
            "echo"
        }
        fn input_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, input: serde_json::Value, _ctx: &mut ToolContext) -> Result<ToolOutput, crate::error::ToolError> {
            Ok(ToolOutput::structured(input))
        }
    }

    struct UnsafeAppend {
        log: Arc<tokio::sync::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Tool for UnsafeAppend {
        fn name(&self) -> &str {
            "unsafe_append"
        }
        fn description(&self) -> &str {
            "appends to a shared log"
        }
        fn input_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object"})
        }
        fn concurrency_safety(&self) -> ConcurrencySafety {
            ConcurrencySafety::Unsafe
        }
        async fn execute(&self, input: serde_json::Value, _ctx: &mut ToolContext) -> Result<ToolOutput, crate::error::ToolError> {
            self.log.lock().await.push(input.to_string());
            Ok(ToolOutput::text("ok"))
        }
    }

    fn base_ctx() -> ToolContext {
        ToolContext::new(
            "base",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        )
    }

    #[tokio::test]
    async fn run_one_reports_validation_errors_as_error_output() {
        struct RequiresField;
        #[async_trait]
        impl Tool for RequiresField {
            fn name(&self) -> &str {
                "requires_field"
            }
            fn description(&self) -> &str {
                "needs a field"
            }
            fn input_schema(&self) -> serde_json::Value {
                serde_json::json!({"type": "object", "required": ["x"]})
            }
            async fn execute(&self, _input: serde_json::Value, _ctx: &mut ToolContext) -> Result<ToolOutput, crate::error::ToolError> {
                Ok(ToolOutput::text(""))
            }
        }

        let mut ctx = base_ctx();
        let output = run_one(&RequiresField, serde_json::json!({}), &mut ctx).await;
        assert!(output.is_error);
    }

    #[tokio::test]
    async fn dispatch_preserves_call_order_across_safe_and_unsafe() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SafeEcho));
        let log = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        registry.register(Arc::new(UnsafeAppend { log }));

        let calls = vec![
            ToolCall {
                id: "c1".to_string(),
                name: "unsafe_append".to_string(),
                arguments: serde_json::json!({"n": 1}),
            },
            ToolCall {
                id: "c2".to_string(),
                name: "safe_echo".to_string(),
                arguments: serde_json::json!({"n": 2}),
            },
        ];

        let ctx = base_ctx();
        let results = dispatch_calls(&registry, &calls, &ctx).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].call_id, "c1");
        assert_eq!(results[1].call_id, "c2");
        assert!(!results[0].output.is_error);
        assert!(!results[1].output.is_error);
    }

    #[tokio::test]
    async fn dispatch_reports_unknown_tool_as_error_without_aborting_batch() {
        let registry = ToolRegistry::new();
        let calls = vec![ToolCall {
            id: "c1".to_string(),
            name: "does_not_exist".to_string(),
            arguments: serde_json::json!({}),
        }];
        let ctx = base_ctx();
        let results = dispatch_calls(&registry, &calls, &ctx).await;
        assert_eq!(results.len(), 1);
        assert!(results[0].output.is_error);
    }
}
