//! Authorization gate (spec §4.4.2): Sensitive and Elevated tool calls
//! consult an [`Authorizer`] before they may run. Decisions can widen a
//! standing approval (`AllowedForSession`/`AllowedForWorkspace`) so later
//! matching calls skip the prompt.

use crate::rules::PermissionRuleEvaluator;
use async_trait::async_trait;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::PermissionDecision;
use std::path::Path;
use std::time::Duration;

/// Asks an external party (CLI prompt, frontend round-trip, pre-seeded
/// config) whether a tool call not resolved by the static rule set may
/// proceed. Implementations may be synchronous UI round-trips; the
/// orchestrator pauses the LLM loop while this future is pending.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, tool_name: &str, path: Option<&Path>, description: &str) -> PermissionDecision;
}

/// An authorizer that denies anything not already resolved by a rule,
/// after waiting briefly — models the "timeout defaults to denied" clause
/// of spec §4.4.2 for headless/non-interactive contexts.
pub struct TimeoutDenyAuthorizer {
    pub timeout: Duration,
}

impl Default for TimeoutDenyAuthorizer {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(0),
        }
    }
}

#[async_trait]
impl Authorizer for TimeoutDenyAuthorizer {
    async fn authorize(&self, tool_name: &str, _path: Option<&Path>, _description: &str) -> PermissionDecision {
        if !self.timeout.is_zero() {
            tokio::time::sleep(self.timeout).await;
        }
        PermissionDecision::Denied {
            reason: format!("no authorizer configured for {tool_name}; defaulting to denied"),
        }
    }
}

/// Ties the static rule evaluator to an [`Authorizer`] fallback. Safe-tier
/// calls are never consulted; Elevated/Sensitive calls check rules first,
/// then fall through to the authorizer.
pub struct PermissionGate {
    rules: PermissionRuleEvaluator,
    authorizer: Box<dyn Authorizer>,
}

impl PermissionGate {
    pub fn new(rules: PermissionRuleEvaluator, authorizer: Box<dyn Authorizer>) -> Self {
        Self { rules, authorizer }
    }

    pub async fn check(
        &self,
        tier: AuthorizationTier,
        tool_name: &str,
        path: Option<&Path>,
        description: &str,
    ) -> PermissionDecision {
        if tier == AuthorizationTier::Safe {
            return PermissionDecision::Allowed;
        }
        if let Some(decision) = self.rules.evaluate(tool_name, path) {
            return decision;
        }
        self.authorizer.authorize(tool_name, path, description).await
    }
}
