//! The `config.yaml` document shape and its defaults.

use crate::mcp::McpServersConfig;
use crate::mcp::SearchConfig;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Per-role model selection (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelRoles {
    #[serde(default = "default_main_model")]
    pub main: String,
    #[serde(default)]
    pub fast: Option<String>,
}

fn default_main_model() -> String {
    "anthropic/claude-sonnet".to_string()
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self {
            main: default_main_model(),
            fast: None,
        }
    }
}

/// Structured logging configuration (ambient stack).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub location: bool,
    #[serde(default)]
    pub target: bool,
    /// Per-module overrides, e.g. `["journeyman_shell=debug"]`.
    #[serde(default)]
    pub modules: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            location: false,
            target: false,
            modules: Vec::new(),
        }
    }
}

/// Tool registry / parallel execution tuning (spec §4.5, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,
    #[serde(default)]
    pub parallel_tool_execution: bool,
}

fn default_max_concurrency() -> u32 {
    8
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            parallel_tool_execution: true,
        }
    }
}

/// Permission rules configuration section (spec §4.4).
///
/// Tool patterns follow `Name` or `Name(path-glob)`, e.g. `"Bash(git *)"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default)]
    pub ask: Vec<String>,
}

/// Safety envelope overrides (spec §4.4).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SafetyConfig {
    /// Additional sensitive-file glob patterns beyond the built-in table.
    #[serde(default)]
    pub extra_sensitive_patterns: Vec<String>,
    /// Require a digest-verified read before any edit, even for newly
    /// created files in this session (stricter than the default advisory check).
    #[serde(default)]
    pub strict_read_ledger: bool,
}

/// Sandbox executor configuration (spec §4.4 supplement).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SandboxConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allow_network: bool,
    #[serde(default)]
    pub allowed_paths: Vec<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_network: false,
            allowed_paths: Vec::new(),
        }
    }
}

/// Error judge retry tuning (spec §4.8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorJudgeConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub enable_fallback: bool,
    #[serde(default)]
    pub fallback_models: Vec<String>,
}

fn default_max_retries() -> u32 {
    6
}

impl Default for ErrorJudgeConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            enable_fallback: false,
            fallback_models: Vec::new(),
        }
    }
}

/// Compaction / summarizer tuning (spec §4.10).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompactionConfig {
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: u32,
    #[serde(default = "default_chunk_tokens")]
    pub chunk_tokens: u32,
}

fn default_chars_per_token() -> u32 {
    4
}

fn default_chunk_tokens() -> u32 {
    8_000
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            chars_per_token: default_chars_per_token(),
            chunk_tokens: default_chunk_tokens(),
        }
    }
}

/// Authentication scheme for the socket protocol (spec §6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SocketAuthMethod {
    None,
    Token,
    ChallengeResponse,
    PeerCredentials,
}

impl Default for SocketAuthMethod {
    fn default() -> Self {
        Self::PeerCredentials
    }
}

/// Newline-delimited-JSON socket frontend configuration (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocketConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_socket_path")]
    pub path: String,
    #[serde(default = "default_socket_permissions")]
    pub permissions: u32,
    #[serde(default = "default_true")]
    pub require_auth: bool,
    #[serde(default)]
    pub auth_method: SocketAuthMethod,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub allowed_uids: Vec<u32>,
    #[serde(default)]
    pub allowed_gids: Vec<u32>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_max_sessions_per_connection")]
    pub max_sessions_per_connection: u32,
    #[serde(default = "default_connection_timeout", with = "humantime_serde")]
    pub connection_timeout: Duration,
    #[serde(default)]
    pub batching_enabled: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_true() -> bool {
    true
}

fn default_socket_path() -> String {
    "~/.journeyman/journeyman.sock".to_string()
}

fn default_socket_permissions() -> u32 {
    0o600
}

fn default_max_connections() -> u32 {
    16
}

fn default_max_sessions_per_connection() -> u32 {
    4
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_batch_size() -> u32 {
    32
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_socket_path(),
            permissions: default_socket_permissions(),
            require_auth: true,
            auth_method: SocketAuthMethod::default(),
            token: None,
            allowed_uids: Vec::new(),
            allowed_gids: Vec::new(),
            max_connections: default_max_connections(),
            max_sessions_per_connection: default_max_sessions_per_connection(),
            connection_timeout: default_connection_timeout(),
            batching_enabled: false,
            batch_size: default_batch_size(),
        }
    }
}

/// Per-workspace policy overlay, keyed by workspace root path (spec §6:
/// "context directories per workspace, domain allowlist per workspace,
/// command allowlist per workspace").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkspacePolicy {
    #[serde(default)]
    pub context_dirs: Vec<String>,
    #[serde(default)]
    pub domain_allowlist: Vec<String>,
    #[serde(default)]
    pub command_allowlist: Vec<String>,
}

/// The fully-resolved `~/.journeyman/config.yaml` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigDocument {
    #[serde(default)]
    pub models: ModelRoles,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub error_judge: ErrorJudgeConfig,
    #[serde(default)]
    pub compaction: CompactionConfig,
    #[serde(default)]
    pub mcp_servers: McpServersConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub socket: SocketConfig,
    /// Keyed by absolute workspace root path.
    #[serde(default)]
    pub workspaces: HashMap<String, WorkspacePolicy>,
}

impl ConfigDocument {
    /// The policy overlay for `workspace_root`, or an empty default if none
    /// is configured.
    pub fn workspace_policy(&self, workspace_root: &str) -> WorkspacePolicy {
        self.workspaces.get(workspace_root).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod workspace_tests {
    use super::*;

    #[test]
    fn unconfigured_workspace_yields_empty_policy() {
        let doc = ConfigDocument::default();
        assert_eq!(doc.workspace_policy("/tmp/proj"), WorkspacePolicy::default());
    }

    #[test]
    fn configured_workspace_policy_round_trips_through_yaml() {
        let yaml = "workspaces:\n  /tmp/proj:\n    domain_allowlist: [\"api.example.com\"]\n";
        let doc: ConfigDocument = serde_yml::from_str(yaml).expect("parse");
        assert_eq!(
            doc.workspace_policy("/tmp/proj").domain_allowlist,
            vec!["api.example.com".to_string()]
        );
    }
}
