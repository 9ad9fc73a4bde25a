//! `todo` (spec §4.5): list/add/check/uncheck/delete, with sub-todo support.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::ContextModifier;
use journeyman_protocol::ToolOutput;
use serde_json::Value;

pub struct TodoTool;

impl TodoTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TodoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for TodoTool {
    fn name(&self) -> &str {
        "todo"
    }

    fn description(&self) -> &str {
        "Manages the session's todo list: list, add (with an optional parent for sub-todos), check, uncheck, delete."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {"type": "string", "enum": ["list", "add", "check", "uncheck", "delete"]},
                "id": {"type": "string"},
                "text": {"type": "string"},
                "parent_id": {"type": "string"}
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let action = input["action"].as_str().ok_or_else(|| ToolError::invalid_input("action must be a string"))?;

        let output = match action {
            "list" => {
                let todos = ctx.session.todos().await;
                ToolOutput::structured(serde_json::json!({"items": todos.items()}))
            }
            "add" => {
                let id = input["id"].as_str().ok_or_else(|| ToolError::invalid_input("add requires id"))?;
                let text = input["text"].as_str().ok_or_else(|| ToolError::invalid_input("add requires text"))?;
                let parent_id = input.get("parent_id").and_then(Value::as_str).map(str::to_string);
                let item = ctx
                    .session
                    .add_todo(id, text, parent_id)
                    .await
                    .map_err(|source| ToolError::Session { source })?;
                ToolOutput::structured(serde_json::to_value(item).unwrap_or(Value::Null))
            }
            "check" | "uncheck" => {
                let id = input["id"].as_str().ok_or_else(|| ToolError::invalid_input("check/uncheck requires id"))?;
                ctx.session
                    .check_todo(id, action == "check")
                    .await
                    .map_err(|source| ToolError::Session { source })?;
                ToolOutput::text(format!("{id} marked {}", if action == "check" { "done" } else { "not done" }))
            }
            "delete" => {
                let id = input["id"].as_str().ok_or_else(|| ToolError::invalid_input("delete requires id"))?;
                let deleted = ctx
                    .session
                    .delete_todo(id)
                    .await
                    .map_err(|source| ToolError::Session { source })?;
                ToolOutput::structured(serde_json::json!({"deleted": deleted}))
            }
            other => return Err(ToolError::invalid_input(format!("unknown action: {other}"))),
        };

        Ok(output.with_modifier(ContextModifier::TodoChanged))
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
            ShellExecutor::new(),
            BackgroundController::new(),
        )
    }

    #[tokio::test]
    async fn add_then_list_round_trips() {
        let mut ctx = ctx();
        TodoTool::new()
            .execute(serde_json::json!({"action": "add", "id": "t1", "text": "write tests"}), &mut ctx)
            .await
            .unwrap();
        let output = TodoTool::new().execute(serde_json::json!({"action": "list"}), &mut ctx).await.unwrap();
        assert!(output.content.as_message_text().contains("write tests"));
    }

    #[tokio::test]
    async fn check_then_uncheck_toggles_completion() {
        let mut ctx = ctx();
        TodoTool::new()
            .execute(serde_json::json!({"action": "add", "id": "t1", "text": "a"}), &mut ctx)
            .await
            .unwrap();
        TodoTool::new()
            .execute(serde_json::json!({"action": "check", "id": "t1"}), &mut ctx)
            .await
            .unwrap();
        let todos = ctx.session.todos().await;
        assert!(todos.items().iter().find(|t| t.id == "t1").unwrap().completed);
    }

    #[tokio::test]
    async fn delete_cascades_to_children() {
        let mut ctx = ctx();
        TodoTool::new()
            .execute(serde_json::json!({"action": "add", "id": "root", "text": "root"}), &mut ctx)
            .await
            .unwrap();
        TodoTool::new()
            .execute(serde_json::json!({"action": "add", "id": "child", "text": "child", "parent_id": "root"}), &mut ctx)
            .await
            .unwrap();
        let output = TodoTool::new()
            .execute(serde_json::json!({"action": "delete", "id": "root"}), &mut ctx)
            .await
            .unwrap();
        assert!(output.content.as_message_text().contains("child"));
    }
}
