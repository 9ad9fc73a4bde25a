//! Wire and in-process types shared across the Journeyman workspace:
//! conversation messages, tool descriptors/results, the authorization
//! gate's vocabulary, loop events, and token accounting.

mod events;
mod message;
mod permission;
mod tool;
mod usage;

pub use events::{LoopEvent, ToolProgressInfo};
pub use message::{validate_message_sequence, Message, Role, ToolCall};
pub use permission::{PermissionDecision, PermissionRule, RuleAction, RuleSource};
pub use tool::{
    ApprovalRequest, AuthorizationTier, ConcurrencySafety, ContextModifier, ExecutionKind,
    PermissionResult, RiskSeverity, RiskType, SecurityRisk, ToolDefinition, ToolOutput,
    ToolResultContent, ValidationError, ValidationResult,
};
pub use usage::TokenUsage;
