//! Event types emitted from the tool pipeline and the orchestrator loop,
//! consumed by whatever frontend (CLI, app server) is driving a session.

use serde::Deserialize;
use serde::Serialize;

/// Incremental progress reported by a long-running tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProgressInfo {
    pub call_id: String,
    pub message: String,
    pub percent: Option<u8>,
}

/// Events streamed out of the orchestrator while a turn is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoopEvent {
    TurnStarted { turn: u32 },
    AssistantTextDelta { text: String },
    ToolCallStarted { call_id: String, tool_name: String },
    ToolProgress(ToolProgressInfo),
    ToolCallFinished { call_id: String, is_error: bool },
    ApprovalRequested { request_id: String },
    /// `ask_user` (spec §4.5, §4.9): a free-form question posed to the
    /// frontend, outside the authorization-approval flow.
    QuestionAsked { call_id: String, question: String },
    Compacting,
    Verifying,
    TurnFinished { turn: u32 },
    Error { message: String },
}
