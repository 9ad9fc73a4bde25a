//! `read_file` (spec §4.5): range-supported file read, capped at
//! [`MAX_LINES_PER_CALL`] lines per call with explicit truncation.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::ContextModifier;
use journeyman_protocol::ToolOutput;
use serde_json::Value;

pub const MAX_LINES_PER_CALL: usize = 2000;

pub struct ReadFileTool;

impl ReadFileTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads a file's contents, optionally restricted to a line range. Truncates past 2000 lines per call."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "offset": {"type": "integer", "description": "0-based first line to return"},
                "limit": {"type": "integer", "description": "maximum number of lines to return"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let path_str = input["path"].as_str().ok_or_else(|| ToolError::invalid_input("path must be a string"))?;
        let path = ctx.resolve_path(path_str);

        let contents = ctx.fs.read_file(&path).await.map_err(|source| ToolError::Fs { source })?;

        let offset = input.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
        let requested_limit = input
            .get("limit")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(MAX_LINES_PER_CALL)
            .min(MAX_LINES_PER_CALL);

        let lines: Vec<&str> = contents.lines().collect();
        let start = offset.min(lines.len());
        let end = (start + requested_limit).min(lines.len());
        let slice = &lines[start..end];
        let truncated = end < lines.len() || start > 0;

        let mut text = slice.join("\n");
        if truncated {
            text.push_str(&format!(
                "\n[truncated: showing lines {}-{} of {}]",
                start + 1,
                end,
                lines.len()
            ));
        }

        ctx.session.track_file_read(&path, &contents).await;

        Ok(ToolOutput::text(text).with_modifier(ContextModifier::FileRead { path, content: contents }))
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

    fn ctx_with(fs: MockFileSystem) -> ToolContext {
        ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(fs),
            ShellExecutor::new(),
            BackgroundController::new(),
        )
    }

    #[tokio::test]
    async fn reads_whole_file_when_under_the_cap() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "one\ntwo\nthree").await;
        let mut ctx = ctx_with(fs);
        let output = ReadFileTool::new()
            .execute(serde_json::json!({"path": "a.txt"}), &mut ctx)
            .await
            .unwrap();
        assert!(!output.is_error);
        assert_eq!(output.content.as_message_text(), "one\ntwo\nthree");
    }

    #[tokio::test]
    async fn offset_and_limit_restrict_and_mark_truncation() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "l1\nl2\nl3\nl4\nl5").await;
        let mut ctx = ctx_with(fs);
        let output = ReadFileTool::new()
            .execute(serde_json::json!({"path": "a.txt", "offset": 1, "limit": 2}), &mut ctx)
            .await
            .unwrap();
        let text = output.content.as_message_text();
        assert!(text.contains("l2"));
        assert!(text.contains("l3"));
        assert!(!text.contains("l1"));
        assert!(text.contains("truncated"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let fs = MockFileSystem::new();
        let mut ctx = ctx_with(fs);
        let result = ReadFileTool::new()
            .execute(serde_json::json!({"path": "missing.txt"}), &mut ctx)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn successful_read_is_tracked_in_the_session_ledger() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "hi").await;
        let mut ctx = ctx_with(fs);
        ReadFileTool::new()
            .execute(serde_json::json!({"path": "a.txt"}), &mut ctx)
            .await
            .unwrap();
        assert!(ctx.session.was_file_read("/tmp/a.txt").await);
    }
}
