//! Errors returned by the session store.

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SessionError {
    #[snafu(display("message sequence invariant violated: {reason}"))]
    MalformedSequence { reason: String },

    #[snafu(display("todo item {id} not found"))]
    TodoNotFound { id: String },

    #[snafu(display("todo parent {parent_id} not found"))]
    TodoParentNotFound { parent_id: String },

    #[snafu(display("background job {id} not found"))]
    JobNotFound { id: String },

    #[snafu(display("background job {id} is already registered"))]
    JobAlreadyExists { id: String },

    #[snafu(display("failed to (de)serialize session snapshot: {source}"))]
    Serde { source: serde_json::Error },
}

impl WithStatusCode for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::MalformedSequence { .. } => StatusCode::InvalidRequest,
            SessionError::TodoNotFound { .. } | SessionError::JobNotFound { .. } => {
                StatusCode::NotFound
            }
            SessionError::TodoParentNotFound { .. } => StatusCode::NotFound,
            SessionError::JobAlreadyExists { .. } => StatusCode::Conflict,
            SessionError::Serde { .. } => StatusCode::ParseError,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
