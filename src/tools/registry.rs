use super::traits::Tool;
use super::types::{ToolResult, ToolSpec};
use crate::error::ToolError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Central registry for tool instances.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Return specs for all registered tools, sorted by name.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|tool| tool.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute a tool. Unknown names yield an unsuccessful result rather
    /// than an error.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<ToolResult> {
        let Some(tool) = self.tools.get(name) else {
            let missing = ToolError::NotFound {
                name: name.to_string(),
            };
            tracing::debug!(%missing, "Rejecting tool call");
            return Ok(ToolResult::failed(missing.to_string()));
        };

        tracing::debug!(tool = name, "Executing tool");
        tool.execute(args).await
    }
}
