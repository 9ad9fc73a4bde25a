//! Per-session tool registry (spec §4.5): binds the reserved tool set to
//! one session's context so lookups and schema listings stay in one place.

use crate::error::NotFoundSnafu;
use crate::error::Result;
use crate::tool::Tool;
use journeyman_protocol::ToolDefinition;
use snafu::OptionExt;
use std::collections::HashMap;
use std::sync::Arc;

/// Holds every tool available to one session, keyed by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools.get(name).cloned().context(NotFoundSnafu { name })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Tool definitions for the model's system prompt, in registration order
    /// is not guaranteed; callers that need a stable order should sort.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.to_definition()).collect()
    }
}
