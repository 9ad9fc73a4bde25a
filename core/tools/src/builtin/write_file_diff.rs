//! `write_file_diff` (spec §4.5): applies a unified-diff patch against a
//! file the session has already read. Read-before-write is enforced before
//! the patch is applied (spec §4.4.1).

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::ConcurrencySafety;
use journeyman_protocol::ContextModifier;
use journeyman_protocol::ToolOutput;
use serde_json::Value;

pub struct WriteFileDiffTool;

impl WriteFileDiffTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WriteFileDiffTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WriteFileDiffTool {
    fn name(&self) -> &str {
        "write_file_diff"
    }

    fn description(&self) -> &str {
        "Applies a unified-diff patch to a previously read file."
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
                "diff": {"type": "string", "description": "unified diff hunks (@@ ... @@ with leading space/+/- lines)"}
            },
            "required": ["path", "diff"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let path_str = input["path"].as_str().ok_or_else(|| ToolError::invalid_input("path must be a string"))?;
        let diff = input["diff"].as_str().ok_or_else(|| ToolError::invalid_input("diff must be a string"))?;
        let path = ctx.resolve_path(path_str);

        journeyman_safety::enforce_read_before_write(&ctx.session, ctx.fs.as_ref(), &path, ctx.strict_read_ledger)
            .await
            .map_err(|source| ToolError::Safety { source })?;

        let original = ctx.fs.read_file(&path).await.map_err(|source| ToolError::Fs { source })?;
        let patched = apply_unified_diff(&original, diff)
            .map_err(ToolError::invalid_input)?;

        ctx.fs.write_file(&path, &patched).await.map_err(|source| ToolError::Fs { source })?;
        journeyman_safety::record_write(&ctx.session, &path, &patched).await;

        Ok(ToolOutput::text(format!("patched {}", path.display()))
            .with_modifier(ContextModifier::FileModified { path }))
    }
}

/// Applies a minimal unified-diff hunk set to `original`, line by line.
/// Supports ` `/`+`/`-` prefixed lines within `@@ ... @@` hunks; ignores
/// `---`/`+++` file headers. Context lines must match exactly or the patch
/// is rejected as inapplicable.
fn apply_unified_diff(original: &str, diff: &str) -> Result<String, String> {
    let original_lines: Vec<&str> = original.lines().collect();
    let mut result: Vec<String> = Vec::new();
    let mut cursor = 0usize;
    let mut in_hunk = false;

    for line in diff.lines() {
        if line.starts_with("--- ") || line.starts_with("+++ ") {
            continue;
        }
        if line.starts_with("@@") {
            in_hunk = true;
            continue;
        }
        if !in_hunk {
            continue;
        }
        if let Some(added) = line.strip_prefix('+') {
            result.push(added.to_string());
        } else if let Some(removed) = line.strip_prefix('-') {
            let expected = removed;
            let actual = original_lines.get(cursor).copied().unwrap_or_default();
            if actual != expected {
                return Err(format!(
                    "diff does not apply: expected to remove \"{expected}\" at line {}, found \"{actual}\"",
                    cursor + 1
                ));
            }
            cursor += 1;
        } else {
            let context = line.strip_prefix(' ').unwrap_or(line);
            let actual = original_lines.get(cursor).copied().unwrap_or_default();
            if actual != context {
                return Err(format!(
                    "diff does not apply: expected context \"{context}\" at line {}, found \"{actual}\"",
                    cursor + 1
                ));
            }
            result.push(actual.to_string());
            cursor += 1;
        }
    }

    result.extend(original_lines[cursor..].iter().map(|s| s.to_string()));
    Ok(result.join("\n"))
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

    #[test]
    fn applies_a_simple_replacement_hunk() {
        let original = "one\ntwo\nthree";
        let diff = "--- a\n+++ b\n@@ -1,3 +1,3 @@\n one\n-two\n+TWO\n three";
        let patched = apply_unified_diff(original, diff).unwrap();
        assert_eq!(patched, "one\nTWO\nthree");
    }

    #[test]
    fn mismatched_context_is_rejected() {
        let original = "one\ntwo\nthree";
        let diff = "@@ -1,3 +1,3 @@\n one\n-WRONG\n+TWO\n three";
        assert!(apply_unified_diff(original, diff).is_err());
    }

    #[tokio::test]
    async fn refuses_to_patch_an_unread_file() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "one\ntwo").await;
        let mut ctx = ctx_with(fs);
        let result = WriteFileDiffTool::new()
            .execute(
                serde_json::json!({"path": "a.txt", "diff": "@@ -1,2 +1,2 @@\n one\n-two\n+TWO"}),
                &mut ctx,
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn patches_a_previously_read_file() {
        let fs = MockFileSystem::new();
        fs.seed_file("/tmp/a.txt", "one\ntwo").await;
        let mut ctx = ctx_with(fs);
        ctx.session.track_file_read("/tmp/a.txt", "one\ntwo").await;
        let output = WriteFileDiffTool::new()
            .execute(
                serde_json::json!({"path": "a.txt", "diff": "@@ -1,2 +1,2 @@\n one\n-two\n+TWO"}),
                &mut ctx,
            )
            .await
            .unwrap();
        assert!(!output.is_error);
        assert_eq!(ctx.fs.read_file(std::path::Path::new("/tmp/a.txt")).await.unwrap(), "one\nTWO");
    }
}
