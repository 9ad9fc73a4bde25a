//! `shell` (spec §4.5, §4.6): foreground by default, a trailing `&`
//! promotes to a background job.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::ConcurrencySafety;
use journeyman_protocol::ToolOutput;
use journeyman_shell::DEFAULT_TIMEOUT_SECS;
use journeyman_shell::MAX_TIMEOUT_SECS;
use serde_json::Value;
use std::time::Duration;

pub struct ShellTool;

impl ShellTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Runs a shell command, foreground by default. A trailing `&` promotes the command to a background job (see status_program/wait_program/stop_program)."
    }

    fn concurrency_safety(&self) -> ConcurrencySafety {
        ConcurrencySafety::Unsafe
    }

    fn authorization_tier(&self) -> AuthorizationTier {
        AuthorizationTier::Sensitive
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {"type": "string"},
                "timeout_secs": {"type": "integer", "description": "default 30, max 300"}
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let command = input["command"].as_str().ok_or_else(|| ToolError::invalid_input("command must be a string"))?;

        if let Some(background_command) = command.trim_end().strip_suffix('&') {
            let id = ctx
                .background
                .spawn(&ctx.session, background_command.trim_end(), &ctx.cwd)
                .await
                .map_err(|source| ToolError::Shell { source })?;
            return Ok(ToolOutput::structured(serde_json::json!({"job_id": id, "background": true})));
        }

        let timeout_secs = input
            .get("timeout_secs")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .min(MAX_TIMEOUT_SECS);

        let result = ctx
            .shell
            .execute(command, &ctx.cwd, Duration::from_secs(timeout_secs), &ctx.cancel_token)
            .await;

        let output = serde_json::json!({
            "exit_code": result.exit_code,
            "stdout": result.stdout,
            "stderr": result.stderr,
            "duration_ms": result.duration_ms,
            "timed_out": result.timed_out,
        });
        let is_error = result.exit_code != 0;
        let mut tool_output = ToolOutput::structured(output);
        tool_output.is_error = is_error;
        Ok(tool_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_fs::MockFileSystem;
    use journeyman_session::Session;
    use journeyman_session::SessionStore;
    use journeyman_shell::BackgroundController;
    use journeyman_shell::ShellExecutor;
    use std::sync::Arc;

    fn ctx() -> ToolContext {
        ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::with_shell("/bin/sh"),
            BackgroundController::new(),
        )
    }

    #[tokio::test]
    async fn foreground_command_captures_exit_code_and_stdout() {
        let mut ctx = ctx();
        let output = ShellTool::new()
            .execute(serde_json::json!({"command": "echo hi"}), &mut ctx)
            .await
            .unwrap();
        assert!(!output.is_error);
        let text = output.content.as_message_text();
        assert!(text.contains("hi"));
    }

    #[tokio::test]
    async fn nonzero_exit_marks_output_as_error() {
        let mut ctx = ctx();
        let output = ShellTool::new()
            .execute(serde_json::json!({"command": "exit 3"}), &mut ctx)
            .await
            .unwrap();
        assert!(output.is_error);
    }

    #[tokio::test]
    async fn trailing_ampersand_promotes_to_background() {
        let mut ctx = ctx();
        let output = ShellTool::new()
            .execute(serde_json::json!({"command": "sleep 0.1 &"}), &mut ctx)
            .await
            .unwrap();
        assert!(!output.is_error);
        assert!(output.content.as_message_text().contains("job_id"));
    }
}
