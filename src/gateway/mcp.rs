//! JSON-RPC 2.0 endpoint speaking the tool-protocol subset external agents
//! need: `initialize`, `ping`, `tools/list` and `tools/call`.
//!
//! Payloads are `rmcp` model types. The envelope is local so parse errors can
//! answer with a `null` id.

use super::AppState;
use crate::tools::{ToolRegistry, ToolSpec};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorCode, ErrorData, Implementation,
    InitializeResult, JsonObject, JsonRpcVersion2_0, ListToolsResult, ProtocolVersion, RequestId,
    ServerCapabilities, Tool,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    // Only "2.0" deserializes.
    #[serde(rename = "jsonrpc")]
    _version: JsonRpcVersion2_0,
    #[serde(default)]
    id: Option<RequestId>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RpcResult {
    Initialize(InitializeResult),
    Empty(JsonObject),
    ListTools(ListToolsResult),
    CallTool(CallToolResult),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum RpcBody {
    Result(RpcResult),
    Error(ErrorData),
}

#[derive(Debug, Serialize)]
struct RpcReply {
    jsonrpc: JsonRpcVersion2_0,
    id: Option<RequestId>,
    #[serde(flatten)]
    body: RpcBody,
}

impl RpcReply {
    fn new(id: Option<RequestId>, outcome: Result<RpcResult, ErrorData>) -> Self {
        let body = match outcome {
            Ok(result) => RpcBody::Result(result),
            Err(error) => RpcBody::Error(error),
        };
        Self {
            jsonrpc: JsonRpcVersion2_0,
            id,
            body,
        }
    }
}

fn reply(id: Option<RequestId>, outcome: Result<RpcResult, ErrorData>) -> Response {
    Json(RpcReply::new(id, outcome)).into_response()
}

/// POST /mcp
pub(super) async fn handle_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            let error = ErrorData::new(ErrorCode::PARSE_ERROR, format!("Parse error: {e}"), None);
            return reply(None, Err(error));
        }
    };
    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            let error = ErrorData::new(
                ErrorCode::INVALID_REQUEST,
                format!("Invalid request: {e}"),
                None,
            );
            return reply(None, Err(error));
        }
    };

    // Notifications carry no id and get no body.
    let Some(id) = request.id else {
        tracing::debug!(method = %request.method, "Tool protocol notification");
        return StatusCode::ACCEPTED.into_response();
    };

    let outcome = dispatch(&state.tools, &request.method, request.params).await;
    reply(Some(id), outcome)
}

fn server_info() -> InitializeResult {
    InitializeResult {
        protocol_version: ProtocolVersion::V_2025_03_26,
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: Implementation {
            name: "nutrisight".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn protocol_tool(spec: ToolSpec) -> Tool {
    let schema = match spec.parameters {
        Value::Object(schema) => schema,
        _ => JsonObject::new(),
    };
    Tool::new(spec.name, spec.description, Arc::new(schema))
}

async fn call_tool(tools: &ToolRegistry, params: Option<Value>) -> Result<RpcResult, ErrorData> {
    let call: CallToolRequestParams = serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| {
            ErrorData::new(ErrorCode::INVALID_PARAMS, format!("Invalid params: {e}"), None)
        })?;
    let arguments = Value::Object(call.arguments.unwrap_or_default());

    let result = match tools.execute(&call.name, arguments).await {
        Ok(result) if result.success => CallToolResult::success(vec![Content::text(result.output)]),
        Ok(result) => CallToolResult::error(vec![Content::text(
            result.error.unwrap_or_else(|| "Tool failed".into()),
        )]),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    };
    Ok(RpcResult::CallTool(result))
}

async fn dispatch(
    tools: &ToolRegistry,
    method: &str,
    params: Option<Value>,
) -> Result<RpcResult, ErrorData> {
    match method {
        "initialize" => Ok(RpcResult::Initialize(server_info())),
        "ping" => Ok(RpcResult::Empty(JsonObject::new())),
        "tools/list" => {
            let listed = tools.specs().into_iter().map(protocol_tool).collect();
            Ok(RpcResult::ListTools(ListToolsResult::with_all_items(listed)))
        }
        "tools/call" => call_tool(tools, params).await,
        other => Err(ErrorData::new(
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
            None,
        )),
    }
}
