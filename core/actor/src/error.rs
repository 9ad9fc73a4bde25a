//! Errors returned by the actor fabric.

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ActorError {
    /// A send was attempted after the actor's stop hook had already run.
    #[snafu(display("actor {id} has stopped"))]
    ActorStopped { id: String },

    /// [`crate::ActorRegistry::spawn`] was called with an id already present.
    #[snafu(display("actor id {id} is already registered"))]
    DuplicateId { id: String },

    /// No actor is registered under the given id.
    #[snafu(display("no actor registered under id {id}"))]
    NotFound { id: String },

    /// The actor's mailbox was full and the caller chose not to wait.
    #[snafu(display("mailbox for actor {id} is full"))]
    MailboxFull { id: String },
}

impl WithStatusCode for ActorError {
    fn status_code(&self) -> StatusCode {
        match self {
            ActorError::ActorStopped { .. } => StatusCode::Cancelled,
            ActorError::DuplicateId { .. } => StatusCode::Conflict,
            ActorError::NotFound { .. } => StatusCode::NotFound,
            ActorError::MailboxFull { .. } => StatusCode::ServiceUnavailable,
        }
    }
}

pub type Result<T> = std::result::Result<T, ActorError>;
