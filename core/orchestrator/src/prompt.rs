//! `AssemblingPrompt` (spec §4.9): builds the system prompt from workspace
//! metadata, the available tool list, and a context-usage banner, then
//! appends the session's own messages and runs them through the model's
//! message normalizer.

use journeyman_inference::NormalizeMessages;
use journeyman_protocol::Message;
use journeyman_protocol::TokenUsage;
use journeyman_protocol::ToolDefinition;
use std::path::Path;

/// Everything needed to render the leading system message for one
/// `CallingLLM` attempt.
pub struct PromptContext<'a> {
    pub working_dir: &'a Path,
    pub tools: &'a [ToolDefinition],
    /// Standing constraints surfaced to the model verbatim (e.g. "operate
    /// only under /workspace/project", "never commit without confirmation").
    pub active_constraints: &'a [String],
    pub usage: TokenUsage,
    pub context_window: u32,
}

/// Renders the system message text: workspace root, the list of tools the
/// model may call this turn, active constraints, and a usage banner so the
/// model can reason about its own remaining budget.
pub fn render_system_prompt(ctx: &PromptContext<'_>) -> String {
    let mut out = String::new();
    out.push_str("You are an AI programming assistant operating inside a single workspace.\n");
    out.push_str(&format!("Working directory: {}\n", ctx.working_dir.display()));

    if !ctx.tools.is_empty() {
        out.push_str("\nAvailable tools:\n");
        let mut names: Vec<&str> = ctx.tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        for name in names {
            out.push_str("- ");
            out.push_str(name);
            out.push('\n');
        }
    }

    if !ctx.active_constraints.is_empty() {
        out.push_str("\nActive constraints:\n");
        for constraint in ctx.active_constraints {
            out.push_str("- ");
            out.push_str(constraint);
            out.push('\n');
        }
    }

    let used_pct = if ctx.context_window == 0 {
        0.0
    } else {
        (ctx.usage.total() as f64 / ctx.context_window as f64) * 100.0
    };
    out.push_str(&format!(
        "\n[context usage: {} / {} tokens ({used_pct:.1}%)]\n",
        ctx.usage.total(),
        ctx.context_window
    ));

    out
}

/// Assembles the full request message list: the rendered system prompt
/// prepended to the session's history, passed through `normalizer` so
/// provider-specific ordering quirks (e.g. no consecutive assistant turns)
/// are resolved before the request leaves this process.
pub fn assemble_messages(
    ctx: &PromptContext<'_>,
    history: Vec<Message>,
    normalizer: &dyn NormalizeMessages,
) -> Vec<Message> {
    let mut messages = vec![Message::system(render_system_prompt(ctx))];
    messages.extend(history);
    normalizer.normalize(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn system_prompt_lists_tools_sorted() {
        let cwd = PathBuf::from("/workspace/project");
        let tools = vec![
            ToolDefinition::full("shell", "run a command", serde_json::json!({})),
            ToolDefinition::full("read_file", "read a file", serde_json::json!({})),
        ];
        let ctx = PromptContext {
            working_dir: &cwd,
            tools: &tools,
            active_constraints: &[],
            usage: TokenUsage::default(),
            context_window: 100_000,
        };
        let rendered = render_system_prompt(&ctx);
        let read_pos = rendered.find("read_file").unwrap();
        let shell_pos = rendered.find("shell").unwrap();
        assert!(read_pos < shell_pos);
    }

    #[test]
    fn usage_banner_reports_percentage() {
        let cwd = PathBuf::from("/workspace/project");
        let ctx = PromptContext {
            working_dir: &cwd,
            tools: &[],
            active_constraints: &[],
            usage: TokenUsage {
                input_tokens: 50_000,
                output_tokens: 0,
                cached_input_tokens: 0,
            },
            context_window: 100_000,
        };
        let rendered = render_system_prompt(&ctx);
        assert!(rendered.contains("50.0%"));
    }
}
