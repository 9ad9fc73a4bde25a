//! Authorization-gate types for the safety envelope (spec §4.4).

use serde::Deserialize;
use serde::Serialize;

/// Which configuration layer contributed a permission rule. Determines
/// priority when several rules match the same call: session overrides
/// workspace, workspace overrides the built-in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    Default,
    Workspace,
    Session,
}

/// What a matched permission rule resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Deny,
    Ask,
    Allow,
}

/// A single configured authorization rule, matched against a tool name and
/// an optional path argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRule {
    pub source: RuleSource,
    pub tool_pattern: String,
    pub path_pattern: Option<String>,
    pub action: RuleAction,
}

/// Final decision returned by the authorization gate for a tool call.
///
/// `AllowedForSession` and `AllowedForWorkspace` both permit the call to
/// proceed immediately, but additionally widen the approval store so
/// future matching calls skip the prompt (spec §4.4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PermissionDecision {
    Allowed,
    AllowedForSession,
    AllowedForWorkspace,
    Denied { reason: String },
}

impl PermissionDecision {
    pub fn permits_execution(&self) -> bool {
        !matches!(self, PermissionDecision::Denied { .. })
    }
}
