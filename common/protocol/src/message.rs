//! Conversation message types.
//!
//! [`Message`] is the unit the session store, the orchestrator, and the LLM
//! client abstraction all pass around. It is append-only once recorded: a
//! [`Session`](https://docs.rs/journeyman-session) never rewrites a message
//! in place, it only appends new ones (including tool replies).

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// The role a message was authored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single tool invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id for this call, matched against the eventual tool reply.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments, as raw JSON (validated against the tool's schema at dispatch time).
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// A single entry in a conversation.
///
/// Invariant (enforced by [`crate::validate_message_sequence`]): an assistant
/// message carrying `tool_calls` of length N must eventually be followed, in
/// order and before the next assistant message, by exactly N tool messages
/// whose `tool_id` matches one of the declared call ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(tool_calls),
            tool_id: None,
            tool_name: None,
            is_error: None,
        }
    }

    pub fn tool_reply(
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_id: Some(tool_id.into()),
            tool_name: Some(tool_name.into()),
            is_error: Some(is_error),
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_id: None,
            tool_name: None,
            is_error: None,
        }
    }

    /// Ids of the declared tool calls, or an empty slice for non-assistant
    /// messages and assistant messages without tool calls.
    pub fn tool_call_ids(&self) -> Vec<&str> {
        self.tool_calls
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|c| c.id.as_str())
            .collect()
    }
}

/// Validates the well-formedness invariant from spec §3: every assistant
/// message with tool_calls is eventually followed (before the next assistant
/// message) by exactly one tool message per declared id, and no tool message
/// appears without a preceding unmatched assistant tool_call.
pub fn validate_message_sequence(messages: &[Message]) -> Result<(), String> {
    let mut pending: Vec<String> = Vec::new();
    for (idx, msg) in messages.iter().enumerate() {
        match msg.role {
            Role::Assistant => {
                if !pending.is_empty() {
                    return Err(format!(
                        "assistant message at index {idx} appended before {} pending tool replies were resolved",
                        pending.len()
                    ));
                }
                if let Some(calls) = &msg.tool_calls {
                    pending = calls.iter().map(|c| c.id.clone()).collect();
                }
            }
            Role::Tool => {
                let Some(tool_id) = &msg.tool_id else {
                    return Err(format!("tool message at index {idx} is missing tool_id"));
                };
                let Some(pos) = pending.iter().position(|id| id == tool_id) else {
                    return Err(format!(
                        "tool message at index {idx} replies to unknown or already-resolved call {tool_id}"
                    ));
                };
                pending.remove(pos);
            }
            Role::System | Role::User => {
                if !pending.is_empty() {
                    return Err(format!(
                        "{:?} message at index {idx} appended before {} pending tool replies were resolved",
                        msg.role,
                        pending.len()
                    ));
                }
            }
        }
    }
    if !pending.is_empty() {
        return Err(format!(
            "conversation ended with {} unresolved tool calls",
            pending.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_sequence_passes() {
        let messages = vec![
            Message::user("fix the bug"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("c1", "read_file", serde_json::json!({}))],
            ),
            Message::tool_reply("c1", "read_file", "contents", false),
            Message::assistant("done"),
        ];
        assert!(validate_message_sequence(&messages).is_ok());
    }

    #[test]
    fn missing_tool_reply_fails() {
        let messages = vec![Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "read_file", serde_json::json!({}))],
        )];
        assert!(validate_message_sequence(&messages).is_err());
    }

    #[test]
    fn orphan_tool_reply_fails() {
        let messages = vec![Message::tool_reply("c1", "read_file", "x", false)];
        assert!(validate_message_sequence(&messages).is_err());
    }

    #[test]
    fn consecutive_assistant_with_pending_calls_fails() {
        let messages = vec![
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("c1", "read_file", serde_json::json!({}))],
            ),
            Message::assistant("oops"),
        ];
        assert!(validate_message_sequence(&messages).is_err());
    }
}
