//! Error types for the provider-secrets store.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SecretsError {
    #[snafu(display("failed to read {path}: {source}"))]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("secrets file {path} is truncated or not a journeyman secrets file"))]
    InvalidFormat { path: String },

    #[snafu(display("unsupported secrets file version {version}"))]
    UnsupportedVersion { version: u8 },

    #[snafu(display("incorrect password"))]
    BadPassword,

    #[snafu(display("failed to decode secrets payload: {source}"))]
    Decode { source: serde_json::Error },
}

pub type Result<T> = std::result::Result<T, SecretsError>;
