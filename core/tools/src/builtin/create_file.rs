//! `create_file` (spec §4.5): fails if the path already exists. A
//! successful create is tracked as read so a later diff against it is
//! permitted without a prior `read_file` call (spec §4.4.1).

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::ConcurrencySafety;
use journeyman_protocol::ContextModifier;
use journeyman_protocol::ToolOutput;
use serde_json::Value;

pub struct CreateFileTool;

impl CreateFileTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CreateFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CreateFileTool {
    fn name(&self) -> &str {
        "create_file"
    }

    fn description(&self) -> &str {
        "Creates a new file with the given contents. Fails if the path already exists."
    }

    fn concurrency_safety(&self) -> ConcurrencySafety {
        ConcurrencySafety::Unsafe
    }

    fn authorization_tier(&self) -> AuthorizationTier {
        AuthorizationTier::Elevated
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "contents": {"type": "string"}
            },
            "required": ["path", "contents"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let path_str = input["path"].as_str().ok_or_else(|| ToolError::invalid_input("path must be a string"))?;
        let contents = input["contents"].as_str().ok_or_else(|| ToolError::invalid_input("contents must be a string"))?;
        let path = ctx.resolve_path(path_str);

        if ctx.fs.stat(&path).await.is_ok() {
            return Err(ToolError::Conflict { path: path.display().to_string() });
        }

        ctx.fs.write_file(&path, contents).await.map_err(|source| ToolError::Fs { source })?;
        journeyman_safety::record_create(&ctx.session, &path, contents).await;

        Ok(ToolOutput::text(format!("created {}", path.display()))
            .with_modifier(ContextModifier::FileModified { path: path.clone() })
            .with_modifier(ContextModifier::FileRead { path, content: contents.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_error::WithStatusCode;
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
            ShellExecutor::new(),
            BackgroundController::new(),
        )
    }

    #[tokio::test]
    async fn creates_a_new_file_and_tracks_it_as_read() {
        let mut ctx = ctx();
        let output = CreateFileTool::new()
            .execute(serde_json::json!({"path": "a.txt", "contents": "hi"}), &mut ctx)
            .await
            .unwrap();
        assert!(!output.is_error);
        assert_eq!(ctx.fs.read_file(std::path::Path::new("/tmp/a.txt")).await.unwrap(), "hi");
        assert!(ctx.session.was_file_read("/tmp/a.txt").await);
    }

    #[tokio::test]
    async fn refuses_to_overwrite_an_existing_file() {
        let mut ctx = ctx();
        ctx.fs.write_file(std::path::Path::new("/tmp/a.txt"), "existing").await.unwrap();
        let result = CreateFileTool::new()
            .execute(serde_json::json!({"path": "a.txt", "contents": "new"}), &mut ctx)
            .await;
        assert!(matches!(result, Err(ToolError::Conflict { .. })));
        assert_eq!(result.unwrap_err().status_code(), journeyman_error::StatusCode::Conflict);
        assert_eq!(ctx.fs.read_file(std::path::Path::new("/tmp/a.txt")).await.unwrap(), "existing");
    }

    #[test]
    fn is_unsafe_for_concurrent_execution() {
        assert_eq!(CreateFileTool::new().concurrency_safety(), ConcurrencySafety::Unsafe);
    }
}
