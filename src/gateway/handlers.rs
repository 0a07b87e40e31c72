use super::AppState;
use crate::biometrics::watch_snapshot_from_str;
use crate::error::LlmError;
use crate::media::decode_frame_payload;
use crate::tracking::{ClassificationStatus, FrameOutcome};
use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({"error": message.into()}))).into_response()
}

/// Analyze-frame request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeFrameBody {
    pub image_base64: String,
    #[serde(default)]
    pub enrich_with_search: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchItemQuery {
    pub item_name: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchDataQuery {
    #[serde(rename = "override")]
    pub override_json: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallBody {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// GET /: service banner
pub(super) async fn handle_root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "NutriSight API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health: liveness
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "healthy"}))
}

/// GET /api/protocol: ledger summary
pub(super) async fn handle_protocol(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.coordinator.summary().await)
}

fn llm_failure_response(error: &LlmError) -> Response {
    match error {
        LlmError::NotConfigured { .. } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gemini API key not configured (set GEMINI_API_KEY or GOOGLE_API_KEY)",
        ),
        LlmError::Auth { .. } | LlmError::Request { .. } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}

/// POST /api/analyze-frame: run one frame through the coordinator
pub(super) async fn handle_analyze_frame(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeFrameBody>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {e}. Expected: {{\"image_base64\": \"...\"}}"),
            );
        }
    };

    let frame = match decode_frame_payload(&request.image_base64) {
        Ok(frame) => frame,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let outcome = match state.coordinator.process_frame(&frame).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Frame analysis failed");
            return llm_failure_response(&e);
        }
    };

    let search_info = if outcome.is_completed() && request.enrich_with_search {
        enrich(&state, &outcome).await
    } else {
        None
    };

    Json(analysis_response(&outcome, search_info)).into_response()
}

async fn enrich(state: &AppState, outcome: &FrameOutcome) -> Option<Value> {
    let (name, category) = outcome.enrichment_target()?;
    tracing::info!(item = name, category, "Enriching finished action");
    let info = state.enrichment.lookup(name, category).await?;
    serde_json::to_value(info).ok()
}

fn analysis_response(outcome: &FrameOutcome, search_info: Option<Value>) -> Value {
    let agent_state = json!({
        "current_action": outcome.state.current_action,
        "action_progress": outcome.state.action_progress,
    });
    let classification = &outcome.classification;

    if let Some(entry) = &outcome.committed {
        return json!({
            "success": true,
            "analysis": classification.payload,
            "action_in_progress": false,
            "action_completed": true,
            "detected_action": entry.title,
            "item_name": classification.item_name,
            "category": entry.action_type,
            "frames_analyzed": outcome.frames_analyzed.unwrap_or_default(),
            "search_info": search_info,
            "ledger_entry": entry,
            "protocol": outcome.summary,
            "agent_state": agent_state,
        });
    }

    let in_progress = matches!(
        classification.status,
        ClassificationStatus::Started | ClassificationStatus::InProgress
    );
    let mut response = json!({
        "success": true,
        "analysis": classification.payload,
        "action_in_progress": in_progress,
        "frames_buffered": outcome.frames_buffered,
        "protocol": outcome.summary,
        "agent_state": agent_state,
    });
    if !in_progress {
        response["action_completed"] = Value::Bool(false);
    }
    response
}

/// GET /api/agent-state: label, stage, buffered frames, ledger summary
pub(super) async fn handle_agent_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.coordinator.snapshot().await)
}

/// POST /api/reset-agent: clear tracking state, frame buffer and ledger
pub(super) async fn handle_reset_agent(State(state): State<AppState>) -> impl IntoResponse {
    state.coordinator.reset().await;
    Json(json!({"status": "reset", "message": "Agent and protocol cleared"}))
}

/// POST /api/search-item?item_name=..&category=..
pub(super) async fn handle_search_item(
    State(state): State<AppState>,
    Query(query): Query<SearchItemQuery>,
) -> Response {
    let Some(item_name) = query
        .item_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "item_name is required");
    };
    let category = query.category.as_deref().unwrap_or("supplement");

    match state.enrichment.lookup(item_name, category).await {
        Some(info) => Json(info).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Could not find info for {item_name}"),
        ),
    }
}

/// GET /api/smart-watch-data?override=<json>
pub(super) async fn handle_smart_watch_data(
    Query(query): Query<WatchDataQuery>,
) -> impl IntoResponse {
    Json(watch_snapshot_from_str(query.override_json.as_deref()))
}

/// GET /tools: registered tool specs
pub(super) async fn handle_list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({"tools": state.tools.specs()}))
}

/// POST /tools/call: execute one tool by name
pub(super) async fn handle_call_tool(
    State(state): State<AppState>,
    body: Result<Json<ToolCallBody>, JsonRejection>,
) -> Response {
    let Json(call) = match body {
        Ok(body) => body,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {e}. Expected: {{\"name\": \"...\", \"arguments\": {{}}}}"),
            );
        }
    };

    let arguments = if call.arguments.is_null() {
        json!({})
    } else {
        call.arguments
    };
    match state.tools.execute(&call.name, arguments).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
