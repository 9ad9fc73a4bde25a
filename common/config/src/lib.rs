//! Layered configuration for the Journeyman runtime.
//!
//! Values resolve with the following precedence (highest to lowest):
//! 1. CLI flags (applied by the caller, not this crate)
//! 2. `JOURNEYMAN_*` environment variables
//! 3. `~/.journeyman/config.yaml`
//! 4. Built-in defaults

mod document;
mod env;
mod error;
mod loader;
mod mcp;

pub use document::CompactionConfig;
pub use document::ConfigDocument;
pub use document::ErrorJudgeConfig;
pub use document::LoggingConfig;
pub use document::ModelRoles;
pub use document::PermissionsConfig;
pub use document::SafetyConfig;
pub use document::SandboxConfig;
pub use document::SocketAuthMethod;
pub use document::SocketConfig;
pub use document::ToolConfig;
pub use document::WorkspacePolicy;
pub use error::ConfigError;
pub use loader::default_config_dir;
pub use loader::ConfigLoader;
pub use loader::CONFIG_FILE;
pub use loader::DEFAULT_CONFIG_DIR;
pub use mcp::McpServerConfig;
pub use mcp::McpServerKind;
pub use mcp::McpServersConfig;
pub use mcp::SearchConfig;
