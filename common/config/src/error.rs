//! Error types for configuration loading.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("home directory not found"))]
    HomeDirNotFound,

    #[snafu(display("failed to read {path}: {source}"))]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[snafu(display("invalid YAML in {path}: {source}"))]
    Yaml {
        path: String,
        source: serde_yml::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
