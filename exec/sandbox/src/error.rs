//! Errors raised by the sandbox executor and its permission checker
//! (spec §4.5 "go_sandbox").

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SandboxError {
    #[snafu(display("write denied: {message}"))]
    WriteDenied { message: String },

    #[snafu(display("path denied: {path}"))]
    PathDenied { path: String },

    #[snafu(display("network access denied by sandbox policy"))]
    NetworkDenied,

    #[snafu(display("failed to load wasm module: {message}"))]
    ModuleLoad { message: String },

    #[snafu(display("wasm execution failed: {message}"))]
    Execution { message: String },
}

impl WithStatusCode for SandboxError {
    fn status_code(&self) -> StatusCode {
        match self {
            SandboxError::WriteDenied { .. } => StatusCode::SandboxViolation,
            SandboxError::PathDenied { .. } => StatusCode::SandboxViolation,
            SandboxError::NetworkDenied => StatusCode::SandboxViolation,
            SandboxError::ModuleLoad { .. } => StatusCode::Internal,
            SandboxError::Execution { .. } => StatusCode::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;
