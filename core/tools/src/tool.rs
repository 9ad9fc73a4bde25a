//! Tool trait definition with 5-stage pipeline (spec §4.5).

use crate::context::ToolContext;
use crate::error::ToolError;
use async_trait::async_trait;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::ConcurrencySafety;
use journeyman_protocol::PermissionResult;
use journeyman_protocol::ToolDefinition;
use journeyman_protocol::ToolOutput;
use journeyman_protocol::ValidationError;
use journeyman_protocol::ValidationResult;
use serde_json::Value;

/// A tool that can be invoked by the orchestrator loop.
///
/// Tools implement a 5-stage pipeline:
/// 1. **Validate** - check input shape against the JSON schema
/// 2. **Check Permission** - the tool's own gate, prior to the orchestrator's
///    authorization-tier consultation
/// 3. **Execute** - perform the actual work
/// 4. **Post Process** - transform output (optional)
/// 5. **Cleanup** - release resources (optional)
///
/// # Concurrency Safety
///
/// Tools declare their concurrency safety via
/// [`concurrency_safety`](Tool::concurrency_safety):
/// - `Safe` - may run in parallel with other `Safe` tools
/// - `Unsafe` - must run sequentially (file writes, shell, sandbox)
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name, as it appears in the reserved tool set (spec §4.5).
    fn name(&self) -> &str;

    /// Get the tool description shown to the model.
    fn description(&self) -> &str;

    /// Get the JSON schema for tool input.
    fn input_schema(&self) -> Value;

    /// Get the concurrency safety of this tool.
    ///
    /// Default is `Safe`. Override to return `Unsafe` for tools that mutate
    /// session or filesystem state.
    fn concurrency_safety(&self) -> ConcurrencySafety {
        ConcurrencySafety::Safe
    }

    /// Get the authorization tier this tool is classified into (spec
    /// §4.4.2): `Safe` calls proceed without consulting the Authorizer,
    /// `Elevated`/`Sensitive` calls are gated by the orchestrator's
    /// `AuthorizingTools` state.
    ///
    /// Default is `Safe`. Override for tools that write within the
    /// workspace (`Elevated`) or that run shell/sandbox/network commands
    /// (`Sensitive`).
    fn authorization_tier(&self) -> AuthorizationTier {
        AuthorizationTier::Safe
    }

    /// Validate the input before execution.
    ///
    /// Default implementation checks that every field named in the schema's
    /// `required` array is present.
    async fn validate(&self, input: &Value) -> ValidationResult {
        let schema = self.input_schema();

        if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
            for field in required {
                if let Some(field_name) = field.as_str() {
                    if input.get(field_name).is_none() {
                        return ValidationResult::Invalid {
                            errors: vec![ValidationError::with_path(
                                format!("missing required field: {field_name}"),
                                field_name,
                            )],
                        };
                    }
                }
            }
        }

        ValidationResult::Valid
    }

    /// Check whether the tool's own gate allows this call.
    ///
    /// Default implementation always allows; the orchestrator's
    /// authorization-tier consultation (spec §4.9 `AuthorizingTools`) is a
    /// separate, later gate and is not this stage's concern.
    async fn check_permission(&self, _input: &Value, _ctx: &ToolContext) -> PermissionResult {
        PermissionResult::Allowed
    }

    /// Execute the tool with the given input.
    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError>;

    /// Post-process the output after execution. Default returns it unchanged.
    async fn post_process(&self, output: ToolOutput, _ctx: &ToolContext) -> ToolOutput {
        output
    }

    /// Release any resources held for this call. Default does nothing.
    async fn cleanup(&self, _ctx: &ToolContext) {}

    /// Convert to a tool definition for the model's system prompt.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::full(self.name(), self.description(), self.input_schema())
    }

    /// Whether this tool may run alongside other `Safe` tools.
    fn is_concurrent_safe(&self) -> bool {
        matches!(self.concurrency_safety(), ConcurrencySafety::Safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyTool;

    #[async_trait]
    impl Tool for DummyTool {
        fn name(&self) -> &str {
            "dummy"
        }

        fn description(&self) -> &str {
            "a dummy tool for testing"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string"}
                },
                "required": ["message"]
            })
        }

        async fn execute(&self, input: Value, _ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
            let message = input["message"]
                .as_str()
                .ok_or_else(|| ToolError::invalid_input("message must be a string"))?;
            Ok(ToolOutput::text(format!("received: {message}")))
        }
    }

    #[tokio::test]
    async fn name_and_default_concurrency_are_reported() {
        let tool = DummyTool;
        assert_eq!(tool.name(), "dummy");
        assert!(tool.is_concurrent_safe());
    }

    #[tokio::test]
    async fn validate_checks_required_fields() {
        let tool = DummyTool;

        let valid = serde_json::json!({"message": "hello"});
        assert!(tool.validate(&valid).await.is_valid());

        let invalid = serde_json::json!({});
        assert!(matches!(
            tool.validate(&invalid).await,
            ValidationResult::Invalid { .. }
        ));
    }

    #[test]
    fn to_definition_carries_name_and_description() {
        let tool = DummyTool;
        let def = tool.to_definition();
        assert_eq!(def.name, "dummy");
        assert!(def.description.is_some());
    }
}
