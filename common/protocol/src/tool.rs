//! Tool descriptor and result types shared between the tool registry,
//! the safety envelope, and the orchestrator.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Declares how a tool may be scheduled relative to other tool calls in the
/// same fan-out (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencySafety {
    /// May run concurrently with any other `Safe` tool.
    Safe,
    /// Must run sequentially relative to other `Unsafe` tools.
    Unsafe,
}

/// Broad execution-kind classification for a tool descriptor (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionKind {
    Pure,
    Filesystem,
    Shell,
    Network,
    Subagent,
}

/// Authorization tier a tool call is classified into (spec §4.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationTier {
    Safe,
    Elevated,
    Sensitive,
}

/// A single validation failure surfaced back to the model as a tool message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub path: Option<String>,
}

impl ValidationError {
    pub fn with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }
}

/// Outcome of the Validate stage in the tool pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid,
    Invalid { errors: Vec<ValidationError> },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Severity of a security risk surfaced in an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

/// Category of risk a sensitive tool call carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    SensitiveFile,
    SystemConfig,
    ShellCommand,
    NetworkAccess,
    SandboxBypass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityRisk {
    pub risk_type: RiskType,
    pub severity: RiskSeverity,
    pub message: String,
}

/// A request to ask the frontend whether a sensitive/elevated call may proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub request_id: String,
    pub tool_name: String,
    pub description: String,
    pub risks: Vec<SecurityRisk>,
    pub allow_remember: bool,
    pub proposed_prefix_pattern: Option<String>,
}

/// Outcome of the tool's own `check_permission` stage, prior to consulting
/// the session-level [`crate::PermissionDecision`] authorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PermissionResult {
    Allowed,
    Denied { reason: String },
    NeedsApproval { request: ApprovalRequest },
}

/// Side-channel annotations a tool result can attach, so the orchestrator
/// can update session-level ledgers (e.g. mark a path as read) without
/// special-casing individual tool names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContextModifier {
    FileRead { path: PathBuf, content: String },
    FileModified { path: PathBuf },
    TodoChanged,
}

/// Structured or textual tool result payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolResultContent {
    Text(String),
    Structured(Value),
}

impl ToolResultContent {
    /// Render as a string suitable for inclusion in a [`crate::Message`].
    pub fn as_message_text(&self) -> String {
        match self {
            ToolResultContent::Text(s) => s.clone(),
            ToolResultContent::Structured(v) => v.to_string(),
        }
    }
}

/// The result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: ToolResultContent,
    pub is_error: bool,
    #[serde(default)]
    pub modifiers: Vec<ContextModifier>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: ToolResultContent::Text(content.into()),
            is_error: false,
            modifiers: Vec::new(),
        }
    }

    pub fn structured(value: Value) -> Self {
        Self {
            content: ToolResultContent::Structured(value),
            is_error: false,
            modifiers: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: ToolResultContent::Text(message.into()),
            is_error: true,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: ContextModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// Description of a tool, exposed to the LLM as part of the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn full(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
        }
    }
}
