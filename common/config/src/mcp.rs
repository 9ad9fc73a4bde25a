//! MCP (Model Context Protocol) server configuration (spec §6): named
//! servers a workspace can wire in, each either an OpenAPI spec, a
//! subprocess, or an OpenAI-like chat completion endpoint.

use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

fn default_true() -> bool {
    true
}

/// One configured MCP server. `disabled` lets a workspace keep a server's
/// definition around without wiring it in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McpServerConfig {
    pub description: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(flatten)]
    pub kind: McpServerKind,
}

/// Transport-specific configuration, tagged on `type` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum McpServerKind {
    Openapi {
        spec_path: String,
        #[serde(default)]
        default_headers: HashMap<String, String>,
        #[serde(default)]
        default_query: HashMap<String, String>,
    },
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(default)]
        cwd: Option<String>,
        #[serde(default = "default_command_timeout", with = "humantime_serde")]
        timeout: Duration,
    },
    OpenaiLike {
        model: String,
        /// Either a literal key or `env:VAR_NAME` to resolve from the
        /// environment at startup.
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        system_prompt: Option<String>,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_output_tokens: Option<u32>,
        #[serde(default)]
        json_mode: bool,
    },
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(30)
}

impl McpServerKind {
    /// Resolves `api_key` of `OpenaiLike`: `env:VAR` reads from the
    /// environment, anything else is used literally.
    pub fn resolve_api_key(&self) -> Option<String> {
        match self {
            McpServerKind::OpenaiLike { api_key, .. } => Some(resolve_env_or_literal(api_key)),
            _ => None,
        }
    }
}

fn resolve_env_or_literal(value: &str) -> String {
    match value.strip_prefix("env:") {
        Some(var) => std::env::var(var).unwrap_or_default(),
        None => value.to_string(),
    }
}

/// The full `mcp_servers` map, name -> server config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct McpServersConfig {
    #[serde(flatten)]
    pub servers: HashMap<String, McpServerConfig>,
}

impl McpServersConfig {
    pub fn enabled(&self) -> impl Iterator<Item = (&String, &McpServerConfig)> {
        self.servers.iter().filter(|(_, cfg)| !cfg.disabled)
    }
}

/// Web search / URL-fetch configuration (spec §4.5 `web_search` / `read_url`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub allow_read_url: bool,
    #[serde(default)]
    pub provider_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_read_url: true,
            provider_api_key: None,
        }
    }
}
