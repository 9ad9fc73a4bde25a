//! Errors surfaced by the orchestrator itself (distinct from a halted LLM
//! turn, which is a [`crate::TurnOutcome::Failed`] rather than an `Err`).

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OrchestratorError {
    #[snafu(display("session error: {source}"))]
    Session { source: journeyman_session::SessionError },

    #[snafu(display("summarizer error during compaction: {source}"))]
    Summarizer { source: journeyman_summarizer::SummarizerError },
}

impl WithStatusCode for OrchestratorError {
    fn status_code(&self) -> StatusCode {
        match self {
            OrchestratorError::Session { .. } => StatusCode::Internal,
            OrchestratorError::Summarizer { .. } => StatusCode::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
