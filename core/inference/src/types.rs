//! Request/response shapes for the [`crate::Model`] capability trait.

use journeyman_protocol::Message;
use journeyman_protocol::ToolCall;
use journeyman_protocol::ToolDefinition;
use journeyman_protocol::TokenUsage;
use serde::Deserialize;
use serde::Serialize;

/// Why a completion stopped producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
    Length,
    ContentFilter,
}

/// A single request to a [`crate::Model`]: the full message history plus
/// the tool definitions the assistant may call this turn.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// A completed (non-streaming, or fully drained streaming) model response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One incremental event from a streaming completion.
#[derive(Debug, Clone)]
pub enum StreamDelta {
    TextDelta(String),
    ToolCallDelta(ToolCall),
    Finished {
        finish_reason: FinishReason,
        usage: TokenUsage,
    },
}
