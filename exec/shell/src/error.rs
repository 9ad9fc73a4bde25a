//! Errors raised by the shell/background-job controller (spec §4.6).

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ShellError {
    #[snafu(display("failed to spawn {command}: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("job {id} not found"))]
    JobNotFound { id: String },
}

impl WithStatusCode for ShellError {
    fn status_code(&self) -> StatusCode {
        match self {
            ShellError::Spawn { .. } => StatusCode::IoError,
            ShellError::JobNotFound { .. } => StatusCode::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
