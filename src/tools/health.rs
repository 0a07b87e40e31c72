//! Tools that expose the frame coordinator, ledger, enrichment lookup and
//! watch simulator to external agents.

use super::traits::Tool;
use super::types::ToolResult;
use crate::biometrics::watch_snapshot_from_str;
use crate::error::ToolError;
use crate::media::decode_frame_payload;
use crate::tracking::{EnrichmentLookup, FrameCoordinator, FrameOutcome};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

fn required_str<'a>(tool: &str, args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments {
            name: tool.to_string(),
            message: format!("Missing '{key}' parameter"),
        })
}

/// Frame report returned by `interpret_health_snapshot`.
pub fn frame_report(outcome: &FrameOutcome) -> Value {
    let status = outcome.classification.status.to_string();
    if let Some(entry) = &outcome.committed {
        let frames_analyzed = outcome.frames_analyzed.unwrap_or_default();
        let video_analysis = (frames_analyzed > 0).then(|| {
            format!(
                "Action '{}' completed. Captured {frames_analyzed} frames during the action sequence.",
                entry.title
            )
        });
        return json!({
            "frame_analysis": outcome.classification.payload,
            "action_progress": status,
            "detected_action": entry.title,
            "frames_buffered": outcome.frames_buffered,
            "frames_analyzed": frames_analyzed,
            "video_analysis": video_analysis,
            "action_completed": true,
        });
    }

    json!({
        "frame_analysis": outcome.classification.payload,
        "action_progress": status,
        "frames_buffered": outcome.frames_buffered,
        "video_analysis": null,
    })
}

pub struct InterpretSnapshotTool {
    coordinator: Arc<FrameCoordinator>,
}

impl InterpretSnapshotTool {
    pub fn new(coordinator: Arc<FrameCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl Tool for InterpretSnapshotTool {
    fn name(&self) -> &str {
        "interpret_health_snapshot"
    }

    fn description(&self) -> &str {
        "Analyze one camera frame for a health action (supplement, food, hydration, exercise). \
         Tracks the action across frames and records nutrition data when it finishes."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "image_base64": {
                    "type": "string",
                    "description": "Frame image as base64, optionally as a data: URL"
                }
            },
            "required": ["image_base64"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let payload = required_str(self.name(), &args, "image_base64")?;
        let frame = decode_frame_payload(payload).map_err(|error| ToolError::InvalidArguments {
            name: self.name().to_string(),
            message: error.to_string(),
        })?;

        match self.coordinator.process_frame(&frame).await {
            Ok(outcome) => Ok(ToolResult::json(&frame_report(&outcome))),
            Err(error) => Ok(ToolResult::failed(
                ToolError::Execution {
                    name: self.name().to_string(),
                    message: error.to_string(),
                }
                .to_string(),
            )),
        }
    }
}

pub struct AgentStateTool {
    coordinator: Arc<FrameCoordinator>,
}

impl AgentStateTool {
    pub fn new(coordinator: Arc<FrameCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl Tool for AgentStateTool {
    fn name(&self) -> &str {
        "get_agent_state"
    }

    fn description(&self) -> &str {
        "Get the current action label, its progress and the number of buffered frames."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        let snapshot = self.coordinator.snapshot().await;
        Ok(ToolResult::json(&json!({
            "current_action": snapshot.current_action,
            "action_progress": snapshot.action_progress,
            "frames_buffered": snapshot.frames_buffered,
        })))
    }
}

pub struct ResetAgentTool {
    coordinator: Arc<FrameCoordinator>,
}

impl ResetAgentTool {
    pub fn new(coordinator: Arc<FrameCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl Tool for ResetAgentTool {
    fn name(&self) -> &str {
        "reset_agent"
    }

    fn description(&self) -> &str {
        "Reset action tracking, clear buffered frames and empty the nutrition ledger."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        self.coordinator.reset().await;
        Ok(ToolResult::json(&json!({
            "status": "reset",
            "message": "Agent state, buffers and protocol cleared",
        })))
    }
}

pub struct ProtocolTool {
    coordinator: Arc<FrameCoordinator>,
}

impl ProtocolTool {
    pub fn new(coordinator: Arc<FrameCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl Tool for ProtocolTool {
    fn name(&self) -> &str {
        "get_protocol"
    }

    fn description(&self) -> &str {
        "Get the nutrition ledger: completed actions with calorie, macro and supplement totals."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<ToolResult> {
        let summary = self.coordinator.summary().await;
        Ok(ToolResult::json(&serde_json::to_value(summary)?))
    }
}

pub struct SearchItemTool {
    enrichment: Arc<EnrichmentLookup>,
}

impl SearchItemTool {
    pub fn new(enrichment: Arc<EnrichmentLookup>) -> Self {
        Self { enrichment }
    }
}

#[async_trait]
impl Tool for SearchItemTool {
    fn name(&self) -> &str {
        "search_item"
    }

    fn description(&self) -> &str {
        "Look up health benefits, recommended usage and warnings for a food, drink, supplement \
         or exercise."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item_name": {
                    "type": "string",
                    "description": "Item to look up, e.g. 'Vitamin D3'"
                },
                "category": {
                    "type": "string",
                    "description": "supplement, food, hydration or exercise (default: supplement)"
                }
            },
            "required": ["item_name"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        let item_name = required_str(self.name(), &args, "item_name")?;
        let category = args
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or("supplement");

        match self.enrichment.lookup(item_name, category).await {
            Some(info) => Ok(ToolResult::json(&serde_json::to_value(info)?)),
            None => Ok(ToolResult::failed(format!(
                "Could not find info for {item_name}"
            ))),
        }
    }
}

pub struct WatchDataTool;

#[async_trait]
impl Tool for WatchDataTool {
    fn name(&self) -> &str {
        "get_smart_watch_data"
    }

    fn description(&self) -> &str {
        "Return simulated smart-watch health statistics. Pass override_data as a JSON object \
         string to replace or add fields, e.g. '{\"heart_rate_bpm\": 72}'."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "override_data": {
                    "type": "string",
                    "description": "JSON object merged over the generated values"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<ToolResult> {
        // Agents sometimes pass the override as an object instead of a string.
        let data = match args.get("override_data") {
            Some(Value::String(raw)) => watch_snapshot_from_str(Some(raw.as_str())),
            Some(object @ Value::Object(_)) => crate::biometrics::watch_snapshot(Some(object)),
            _ => watch_snapshot_from_str(None),
        };
        Ok(ToolResult::json(&Value::Object(data)))
    }
}

/// Every health tool, wired to the shared coordinator and lookup.
pub fn health_tools(
    coordinator: &Arc<FrameCoordinator>,
    enrichment: &Arc<EnrichmentLookup>,
) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(InterpretSnapshotTool::new(Arc::clone(coordinator))),
        Box::new(AgentStateTool::new(Arc::clone(coordinator))),
        Box::new(ResetAgentTool::new(Arc::clone(coordinator))),
        Box::new(ProtocolTool::new(Arc::clone(coordinator))),
        Box::new(SearchItemTool::new(Arc::clone(enrichment))),
        Box::new(WatchDataTool),
    ]
}
