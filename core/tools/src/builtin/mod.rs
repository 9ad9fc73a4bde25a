//! The reserved tool set (spec §4.5), registered into a fresh
//! [`crate::ToolRegistry`] by [`register_all`].

mod ask_user;
mod background_jobs;
mod create_file;
mod go_sandbox;
mod parallel_tool_execution;
mod read_file;
mod read_file_summarized;
mod read_url;
mod shell;
mod todo;
mod web_search;
mod write_file_diff;

pub use ask_user::AskUserTool;
pub use background_jobs::StatusProgramTool;
pub use background_jobs::StopProgramTool;
pub use background_jobs::WaitProgramTool;
pub use create_file::CreateFileTool;
pub use go_sandbox::GoSandboxTool;
pub use parallel_tool_execution::ParallelToolExecutionTool;
pub use read_file::ReadFileTool;
pub use read_file_summarized::ReadFileSummarizedTool;
pub use read_url::ReadUrlTool;
pub use shell::ShellTool;
pub use todo::TodoTool;
pub use web_search::WebSearchTool;
pub use write_file_diff::WriteFileDiffTool;

use crate::registry::ToolRegistry;
use std::sync::Arc;

/// Registers the baseline reserved tool set (spec §4.5) with defaults
/// suitable for a headless session: `web_search`/`read_url` start with an
/// empty domain allowlist and search disabled, matching the "gated by
/// domain allowlist" / opt-in clauses of the spec. A caller wiring a real
/// workspace should instead register [`ReadUrlTool`]/[`WebSearchTool`]
/// directly with the workspace's configured allowlist.
pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(Arc::new(ReadFileTool::new()));
    registry.register(Arc::new(ReadFileSummarizedTool::new()));
    registry.register(Arc::new(CreateFileTool::new()));
    registry.register(Arc::new(WriteFileDiffTool::new()));
    registry.register(Arc::new(ShellTool::new()));
    registry.register(Arc::new(StatusProgramTool::new()));
    registry.register(Arc::new(WaitProgramTool::new()));
    registry.register(Arc::new(StopProgramTool::new()));
    registry.register(Arc::new(GoSandboxTool::new()));
    registry.register(Arc::new(ParallelToolExecutionTool::new()));
    registry.register(Arc::new(TodoTool::new()));
    registry.register(Arc::new(ReadUrlTool::default()));
    registry.register(Arc::new(WebSearchTool::default()));
    registry.register(Arc::new(AskUserTool::new()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_reserved_tool_by_name() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry);
        for name in [
            "read_file",
            "read_file_summarized",
            "create_file",
            "write_file_diff",
            "shell",
            "status_program",
            "wait_program",
            "stop_program",
            "go_sandbox",
            "parallel_tool_execution",
            "todo",
            "read_url",
            "web_search",
            "ask_user",
        ] {
            assert!(registry.contains(name), "missing reserved tool: {name}");
        }
    }
}
