//! Errors raised by the LLM client abstraction (spec §4.9 "CallingLLM").

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum InferenceError {
    #[snafu(display("provider error: {message}"))]
    Provider { message: String },

    #[snafu(display("authentication failed: {message}"))]
    AuthenticationFailed { message: String },

    #[snafu(display("context window exceeded: {message}"))]
    ContextOverflow { message: String },

    #[snafu(display("stream error: {message}"))]
    Stream { message: String },

    #[snafu(display("no endpoints found for model {model}: {message}"))]
    NoEndpoints { model: String, message: String },

    #[snafu(display("rate limited: {message}"))]
    RateLimited { message: String },

    #[snafu(display("service unavailable: {message}"))]
    ServiceUnavailable { message: String },

    #[snafu(display("network error: {message}"))]
    Network { message: String },

    #[snafu(display("request timed out after {seconds}s"))]
    Timeout { seconds: u64 },
}

impl WithStatusCode for InferenceError {
    fn status_code(&self) -> StatusCode {
        match self {
            InferenceError::Provider { .. } => StatusCode::ProviderError,
            InferenceError::AuthenticationFailed { .. } => StatusCode::AuthenticationFailed,
            InferenceError::ContextOverflow { .. } => StatusCode::ContextOverflow,
            InferenceError::Stream { .. } => StatusCode::StreamError,
            InferenceError::NoEndpoints { .. } => StatusCode::NoEndpoints,
            InferenceError::RateLimited { .. } => StatusCode::RateLimited,
            InferenceError::ServiceUnavailable { .. } => StatusCode::ServiceUnavailable,
            InferenceError::Network { .. } => StatusCode::NetworkError,
            InferenceError::Timeout { .. } => StatusCode::Timeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, InferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_retryable() {
        let err = InferenceError::RateLimited {
            message: "429".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn authentication_failed_is_not_retryable() {
        let err = InferenceError::AuthenticationFailed {
            message: "bad key".to_string(),
        };
        assert!(!err.is_retryable());
    }
}
