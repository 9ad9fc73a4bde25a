//! `read_file_summarized` (spec §4.5): reads a file and delegates to the
//! chunked map-reduce summarizer rather than returning it verbatim.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::ContextModifier;
use journeyman_protocol::ToolOutput;
use journeyman_summarizer::summarize;
use journeyman_summarizer::SummarizerConfig;
use serde_json::Value;

const BASE_PROMPT: &str = "Summarize the following file, preserving structure and any detail a future reader might need to act on it.";

pub struct ReadFileSummarizedTool;

impl ReadFileSummarizedTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReadFileSummarizedTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReadFileSummarizedTool {
    fn name(&self) -> &str {
        "read_file_summarized"
    }

    fn description(&self) -> &str {
        "Reads a file and returns a model-generated summary instead of the raw contents, for files too large to read directly."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "focus": {"type": "string", "description": "optional hint about what to look for"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let path_str = input["path"].as_str().ok_or_else(|| ToolError::invalid_input("path must be a string"))?;
        let path = ctx.resolve_path(path_str);
        let focus = input.get("focus").and_then(Value::as_str);

        let contents = ctx.fs.read_file(&path).await.map_err(|source| ToolError::Fs { source })?;
        let model = ctx
            .summarizer_model
            .as_ref()
            .ok_or_else(|| ToolError::invalid_input("no summarizer model configured for this session"))?;

        let summary = summarize(model.as_ref(), &contents, BASE_PROMPT, focus, &SummarizerConfig::default())
            .await
            .map_err(|source| ToolError::Summarizer { source })?;

        ctx.session.track_file_read(&path, &contents).await;

        Ok(ToolOutput::text(summary).with_modifier(ContextModifier::FileRead { path, content: contents }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_fs::MockFileSystem;
    use journeyman_inference::MockModel;
    use journeyman_session::Session;
    use journeyman_session::SessionStore;
    use journeyman_shell::BackgroundController;
    use journeyman_shell::ShellExecutor;
    use std::sync::Arc;

    #[tokio::test]
    async fn missing_model_is_reported_as_invalid_input() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "hello world").await;
        let mut ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(fs),
            ShellExecutor::new(),
            BackgroundController::new(),
        );
        let result = ReadFileSummarizedTool::new()
            .execute(serde_json::json!({"path": "a.txt"}), &mut ctx)
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn short_file_is_summarized_in_a_single_call() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "hello world").await;
        let mut ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(fs),
            ShellExecutor::new(),
            BackgroundController::new(),
        )
        .with_summarizer_model(Arc::new(MockModel::always_text("mock", "a short summary")));

        let output = ReadFileSummarizedTool::new()
            .execute(serde_json::json!({"path": "a.txt"}), &mut ctx)
            .await
            .unwrap();
        assert_eq!(output.content.as_message_text(), "a short summary");
        assert!(ctx.session.was_file_read("/tmp/a.txt").await);
    }
}
