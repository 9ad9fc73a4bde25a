//! Tuning knobs for the orchestrator state machine (spec §4.9, §5).

use std::time::Duration;

/// Everything the `AgentLoop`-equivalent driver needs that isn't supplied
/// by one of its collaborators (model, registry, judge, ...).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Hard cap on `CallingLLM` → `ExecutingTools` round trips for a single
    /// user prompt. `None` means unbounded (spec doesn't mandate a default;
    /// callers should set one for interactive use).
    pub max_turns: Option<u32>,
    /// Per-call-id timeout for tool execution (spec §5 default: 30s).
    pub tool_timeout: Duration,
    /// Ceiling on a single `JudgingError` retry sleep (spec §5 default: 120s).
    pub retry_sleep_cap: Duration,
    /// Max attempts the error judge is told about before it is forced to halt.
    pub max_retry_attempts: u32,
    /// Turns kept verbatim at the tail of history when compaction splices in
    /// a summary for everything older (spec §4.9 `Compacting`, "K configurable").
    pub compaction_keep_turns: usize,
    /// Whether a clean `Stop` completion triggers one advisory verification
    /// re-entry (spec §4.9 "Verification"). Off by default for headless/batch
    /// frontends that don't want the extra round trip.
    pub verification_enabled: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_turns: Some(50),
            tool_timeout: Duration::from_secs(30),
            retry_sleep_cap: Duration::from_secs(120),
            max_retry_attempts: 6,
            compaction_keep_turns: 4,
            verification_enabled: true,
        }
    }
}
