use super::types::{ToolResult, ToolSpec};
use async_trait::async_trait;

/// Core tool trait; implement for any capability exposed to external agents
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in `tools/call`)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with given arguments
    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult>;

    /// Get the full spec for registration
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}
