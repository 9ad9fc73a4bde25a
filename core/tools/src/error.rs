//! Errors raised by the tool pipeline (spec §4.5, §7).

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use journeyman_fs::FsError;
use journeyman_safety::SafetyError;
use journeyman_sandbox::SandboxError;
use journeyman_session::SessionError;
use journeyman_shell::ShellError;
use journeyman_summarizer::SummarizerError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ToolError {
    #[snafu(display("invalid input: {message}"))]
    InvalidInput { message: String },

    #[snafu(display("{path} already exists"))]
    Conflict { path: String },

    #[snafu(display("tool {name} not found"))]
    NotFound { name: String },

    #[snafu(display("permission denied: {reason}"))]
    PermissionDenied { reason: String },

    #[snafu(display("safety check failed: {source}"))]
    Safety { source: SafetyError },

    #[snafu(display("filesystem error: {source}"))]
    Fs { source: FsError },

    #[snafu(display("shell error: {source}"))]
    Shell { source: ShellError },

    #[snafu(display("sandbox error: {source}"))]
    Sandbox { source: SandboxError },

    #[snafu(display("summarizer error: {source}"))]
    Summarizer { source: SummarizerError },

    #[snafu(display("session error: {source}"))]
    Session { source: SessionError },

    #[snafu(display("network error: {message}"))]
    Network { message: String },

    #[snafu(display("result too large: {actual} bytes exceeds the {limit} byte cap"))]
    ResultTooLarge { actual: usize, limit: usize },

    #[snafu(display("cancelled"))]
    Cancelled,
}

impl ToolError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ToolError::InvalidInput {
            message: message.into(),
        }
    }
}

impl WithStatusCode for ToolError {
    fn status_code(&self) -> StatusCode {
        match self {
            ToolError::InvalidInput { .. } => StatusCode::InvalidArguments,
            ToolError::Conflict { .. } => StatusCode::Conflict,
            ToolError::NotFound { .. } => StatusCode::NotFound,
            ToolError::PermissionDenied { .. } => StatusCode::AuthorizationDenied,
            ToolError::Safety { source } => source.status_code(),
            ToolError::Fs { source } => source.status_code(),
            ToolError::Shell { source } => source.status_code(),
            ToolError::Sandbox { source } => source.status_code(),
            ToolError::Summarizer { source } => source.status_code(),
            ToolError::Session { source } => source.status_code(),
            ToolError::Network { .. } => StatusCode::NetworkError,
            ToolError::ResultTooLarge { .. } => StatusCode::ResultTooLarge,
            ToolError::Cancelled => StatusCode::Cancelled,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
