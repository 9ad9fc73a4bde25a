//! `go_sandbox` (spec §4.5): runs untrusted code in a wasm sandbox, with the
//! guest's shell requests bridged to the real [`journeyman_shell::ShellExecutor`]
//! under the session's [`journeyman_sandbox::SandboxPolicy`].

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::ConcurrencySafety;
use journeyman_protocol::ToolOutput;
use journeyman_sandbox::PermissionChecker;
use serde_json::Value;

pub struct GoSandboxTool;

impl GoSandboxTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoSandboxTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GoSandboxTool {
    fn name(&self) -> &str {
        "go_sandbox"
    }

    fn description(&self) -> &str {
        "Executes an untrusted WASI command module under the sandbox policy, with guest shell calls bridged to the real shell controller."
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
                "wasm_base64": {"type": "string", "description": "base64-encoded WASI preview1 command module"}
            },
            "required": ["wasm_base64"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let encoded = input["wasm_base64"]
            .as_str()
            .ok_or_else(|| ToolError::invalid_input("wasm_base64 must be a string"))?;
        let wasm_bytes = BASE64.decode(encoded).map_err(|err| ToolError::invalid_input(err.to_string()))?;

        let executor = ctx
            .wasm_executor
            .clone()
            .ok_or_else(|| ToolError::invalid_input("sandbox execution is not enabled for this session"))?;
        let checker = PermissionChecker::new(ctx.sandbox_policy.clone());
        let shell = ctx.shell.clone();
        let cwd = ctx.cwd.clone();
        let runtime = tokio::runtime::Handle::current();

        let result = tokio::task::spawn_blocking(move || executor.run(&wasm_bytes, checker, shell, &cwd, runtime))
            .await
            .map_err(|err| ToolError::Network { message: format!("sandbox task panicked: {err}") })?
            .map_err(|source| ToolError::Sandbox { source })?;

        Ok(ToolOutput::structured(serde_json::json!({
            "exit_code": result.exit_code,
            "stdout": result.stdout,
            "stderr": result.stderr,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_sandbox_executor_is_reported_as_invalid_input() {
        use journeyman_fs::MockFileSystem;
        use journeyman_session::Session;
        use journeyman_session::SessionStore;
        use journeyman_shell::BackgroundController;
        use journeyman_shell::ShellExecutor;
        use std::sync::Arc;

        let mut ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        );
        let result = GoSandboxTool::new()
            .execute(serde_json::json!({"wasm_base64": "aGVsbG8="}), &mut ctx)
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }
}
