pub mod health;
pub mod registry;
pub mod traits;
pub mod types;

pub use health::{
    AgentStateTool, InterpretSnapshotTool, ProtocolTool, ResetAgentTool, SearchItemTool,
    WatchDataTool, frame_report, health_tools,
};
pub use registry::ToolRegistry;
pub use traits::Tool;
pub use types::{ToolResult, ToolSpec};
