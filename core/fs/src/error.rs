//! Errors returned by the filesystem abstraction (spec §4.3).

use journeyman_error::StatusCode;
use journeyman_error::WithStatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FsError {
    #[snafu(display("{path}: not found"))]
    NotFound { path: String },

    #[snafu(display("{path}: permission denied"))]
    PermissionDenied { path: String },

    #[snafu(display("{path}: is a directory"))]
    IsDirectory { path: String },

    #[snafu(display("{path}: looks like binary content, refusing to load as text"))]
    IsBinary { path: String },

    #[snafu(display("{path}: io error: {source}"))]
    Io { path: String, source: std::io::Error },
}

impl WithStatusCode for FsError {
    fn status_code(&self) -> StatusCode {
        match self {
            FsError::NotFound { .. } => StatusCode::NotFound,
            FsError::PermissionDenied { .. } => StatusCode::PermissionDenied,
            FsError::IsDirectory { .. } => StatusCode::IsDirectory,
            FsError::IsBinary { .. } => StatusCode::IsBinary,
            FsError::Io { .. } => StatusCode::IoError,
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Classifies a raw `io::Error` into the taxonomy above, given the path it
/// came from.
pub fn from_io_error(path: impl Into<String>, source: std::io::Error) -> FsError {
    let path = path.into();
    match source.kind() {
        std::io::ErrorKind::NotFound => FsError::NotFound { path },
        std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path },
        _ => FsError::Io { path, source },
    }
}
