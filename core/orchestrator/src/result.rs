//! Terminal outcomes of one user-prompt turn (spec §4.9's `Idle`/`Failed`/
//! `Cancelling` end states).

use journeyman_protocol::TokenUsage;

/// How a call to [`crate::Orchestrator::run_turn`] ended.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The assistant produced a final, non-tool-calling response.
    Completed {
        text: String,
        turns: u32,
        usage: TokenUsage,
        /// Advisory verification summary, if the verification pass ran
        /// (spec §4.9 "Verification": at most once per user prompt).
        verification: Option<String>,
    },
    /// Every tool call in the final `AuthorizingTools` round was denied;
    /// the turn ends without calling the model again (spec §4.9 diagram).
    ReportDenied { reasons: Vec<String> },
    /// `max_turns` was reached before the model stopped requesting tools.
    MaxTurnsReached { turns: u32, usage: TokenUsage },
    /// The error judge returned `halt` on a failed `CallingLLM` attempt.
    Failed { reason: String, turns: u32 },
    /// Cancellation fired while a suspension point was pending.
    Cancelled { turns: u32 },
}
