//! Errors raised by the chunked map-reduce summarizer (spec §4.10).

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use journeyman_inference::InferenceError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SummarizerError {
    #[snafu(display("summarization model call failed: {source}"))]
    Model { source: InferenceError },

    #[snafu(display("input text is empty"))]
    EmptyInput,
}

impl WithStatusCode for SummarizerError {
    fn status_code(&self) -> StatusCode {
        match self {
            SummarizerError::Model { source } => source.status_code(),
            SummarizerError::EmptyInput => StatusCode::InvalidArguments,
        }
    }
}

pub type Result<T> = std::result::Result<T, SummarizerError>;
