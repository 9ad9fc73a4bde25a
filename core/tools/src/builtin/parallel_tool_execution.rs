//! `parallel_tool_execution` (spec §4.7): an explicit multi-call dispatch,
//! for a turn where the assistant wants to enumerate sub-calls itself
//! rather than emit several `tool_calls` entries. Delegates to the same
//! [`crate::executor::dispatch_calls`] the orchestrator uses for ordinary
//! multi-tool-call turns, so the two paths share one scheduling policy.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::executor::dispatch_calls;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::ToolCall;
use journeyman_protocol::ToolOutput;
use serde_json::Value;

pub struct ParallelToolExecutionTool;

impl ParallelToolExecutionTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParallelToolExecutionTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ParallelToolExecutionTool {
    fn name(&self) -> &str {
        "parallel_tool_execution"
    }

    fn description(&self) -> &str {
        "Dispatches several tool calls at once; Safe tools run concurrently, Unsafe tools run sequentially, and results are ordered by the calls array."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "calls": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "name": {"type": "string"},
                            "arguments": {"type": "object"}
                        },
                        "required": ["id", "name"]
                    }
                }
            },
            "required": ["calls"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let registry = ctx
            .registry
            .clone()
            .ok_or_else(|| ToolError::invalid_input("no tool registry attached to this context"))?;

        let raw_calls = input["calls"]
            .as_array()
            .ok_or_else(|| ToolError::invalid_input("calls must be an array"))?;

        let mut calls = Vec::with_capacity(raw_calls.len());
        for entry in raw_calls {
            let id = entry["id"].as_str().ok_or_else(|| ToolError::invalid_input("each call needs an id"))?;
            let name = entry["name"].as_str().ok_or_else(|| ToolError::invalid_input("each call needs a name"))?;
            let arguments = entry.get("arguments").cloned().unwrap_or_else(|| serde_json::json!({}));
            calls.push(ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            });
        }

        let results = dispatch_calls(&registry, &calls, ctx).await;
        let payload: Vec<Value> = results
            .into_iter()
            .map(|r| {
                serde_json::json!({
                    "call_id": r.call_id,
                    "is_error": r.output.is_error,
                    "content": r.output.content.as_message_text(),
                })
            })
            .collect();

        Ok(ToolOutput::structured(serde_json::json!({"results": payload})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolRegistry;
    use journeyman_fs::MockFileSystem;
    use journeyman_session::Session;
    use journeyman_session::SessionStore;
    use journeyman_shell::BackgroundController;
    use journeyman_shell::ShellExecutor;
    use std::sync::Arc;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echo"
        }
        fn input_schema(&self) -> Value {
            serde_json::json!({"type": "object"})
        }
        async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::structured(input))
        }
    }

    #[tokio::test]
    async fn dispatches_sub_calls_through_the_attached_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        let registry = Arc::new(registry);

        let mut ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        )
        .with_registry(registry);

        let output = ParallelToolExecutionTool::new()
            .execute(
                serde_json::json!({"calls": [{"id": "c1", "name": "echo", "arguments": {"x": 1}}]}),
                &mut ctx,
            )
            .await
            .unwrap();
        assert!(!output.is_error);
        assert!(output.content.as_message_text().contains("c1"));
    }

    #[tokio::test]
    async fn missing_registry_is_reported_as_invalid_input() {
        let mut ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        );
        let result = ParallelToolExecutionTool::new()
            .execute(serde_json::json!({"calls": []}), &mut ctx)
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }
}
