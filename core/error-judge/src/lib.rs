//! The error judge (spec §4.8): classifies a failed LLM call and decides
//! whether the orchestrator's `JudgingError` state should retry, retry with
//! a forced compaction, or halt the turn.

mod backoff;
mod decision;
mod heuristic;
mod judge;
mod llm_assisted;

pub use backoff::exponential_backoff_secs;
pub use backoff::linear_backoff_secs;
pub use decision::ErrorJudgeDecision;
pub use heuristic::heuristic_judge;
pub use judge::ErrorJudge;
pub use llm_assisted::llm_assisted_judge;
