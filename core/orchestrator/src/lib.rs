//! The orchestrator state machine (spec §4.9): the seam that drives one
//! session's conversation loop against a [`journeyman_inference::Model`],
//! a [`journeyman_tools::ToolRegistry`], and the safety envelope, looping
//! `CallingLLM -> ExecutingTools` until the model stops requesting tools,
//! `max_turns` is reached, the error judge halts, or cancellation fires.
//!
//! Grounded on the teacher's `core/loop` crate: an `AgentLoop`-equivalent
//! driver (here, [`Orchestrator`]) owning the model, tool registry, and
//! conversation state, exposing a single `run_turn` entry point.

mod compaction;
mod config;
mod error;
mod orchestrator;
mod prompt;
mod result;
mod verification;

pub use config::OrchestratorConfig;
pub use error::OrchestratorError;
pub use error::Result;
pub use orchestrator::Orchestrator;
pub use prompt::render_system_prompt;
pub use prompt::PromptContext;
pub use result::TurnOutcome;
