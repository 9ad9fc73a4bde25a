//! Errors raised by the safety envelope (spec §4.4).

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SafetyError {
    #[snafu(display("{path}: must be read before it can be written"))]
    ReadRequired { path: String },

    #[snafu(display("{path}: has changed on disk since it was last read"))]
    StaleRead { path: String },

    #[snafu(display("{reason}"))]
    AuthorizationDenied { reason: String },

    #[snafu(display("{path}: outside the permitted workspace root"))]
    SandboxViolation { path: String },
}

impl WithStatusCode for SafetyError {
    fn status_code(&self) -> StatusCode {
        match self {
            SafetyError::ReadRequired { .. } => StatusCode::ReadRequired,
            SafetyError::StaleRead { .. } => StatusCode::StaleRead,
            SafetyError::AuthorizationDenied { .. } => StatusCode::AuthorizationDenied,
            SafetyError::SandboxViolation { .. } => StatusCode::SandboxViolation,
        }
    }
}

pub type Result<T> = std::result::Result<T, SafetyError>;

impl SafetyError {
    /// Converts a denied [`journeyman_protocol::PermissionDecision`] into the
    /// error returned by the tool pipeline's `check_permission` stage.
    pub fn from_denied(reason: impl Into<String>) -> Self {
        SafetyError::AuthorizationDenied {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_denied_carries_the_reason() {
        let err = SafetyError::from_denied("no matching rule");
        assert!(matches!(err, SafetyError::AuthorizationDenied { reason } if reason == "no matching rule"));
    }
}
