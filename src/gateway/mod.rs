//! Axum-based HTTP gateway for frame analysis, the nutrition ledger and the
//! tool protocol.
//!
//! - Request body size limit sized for base64 camera frames
//! - Request timeout longer than one classifier round-trip
//! - CORS origins from `[gateway] cors_origins`

mod handlers;
mod mcp;

use handlers::{
    handle_agent_state, handle_analyze_frame, handle_call_tool, handle_health, handle_list_tools,
    handle_protocol, handle_reset_agent, handle_root, handle_search_item, handle_smart_watch_data,
};
use mcp::handle_mcp;

use crate::config::Config;
use crate::providers::{GeminiProvider, Provider};
use crate::tools::{ToolRegistry, health_tools};
use crate::tracking::{ActionClassifier, EnrichmentLookup, FrameCoordinator};
use anyhow::Result;
use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (10 MiB), enough for a base64 camera frame
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;
/// Request timeout (180s), above the classifier's own HTTP timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<FrameCoordinator>,
    pub enrichment: Arc<EnrichmentLookup>,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    /// Wire the coordinator, enrichment lookup and tool registry around one
    /// provider.
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Self {
        let classifier = ActionClassifier::from_config(Arc::clone(&provider), &config.classifier);
        let coordinator = Arc::new(FrameCoordinator::new(
            classifier,
            config.tracking.frame_buffer_capacity,
        ));
        let enrichment = Arc::new(EnrichmentLookup::new(
            provider,
            config.classifier.model.clone(),
            config.classifier.temperature,
            config.enrichment.clone(),
        ));

        let mut registry = ToolRegistry::new();
        for tool in health_tools(&coordinator, &enrichment) {
            registry.register(tool);
        }

        Self {
            coordinator,
            enrichment,
            tools: Arc::new(registry),
        }
    }

    /// State backed by the Gemini provider described in `config`.
    pub fn from_config(config: &Config) -> Self {
        let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::from_config(&config.classifier));
        Self::new(provider, config)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin.trim() == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}

/// Build the router with all routes and layers.
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/protocol", get(handle_protocol))
        .route("/api/analyze-frame", post(handle_analyze_frame))
        .route("/api/agent-state", get(handle_agent_state))
        .route("/api/reset-agent", post(handle_reset_agent))
        .route("/api/search-item", post(handle_search_item))
        .route("/api/smart-watch-data", get(handle_smart_watch_data))
        .route("/tools", get(handle_list_tools))
        .route("/tools/call", post(handle_call_tool))
        .route("/mcp", post(handle_mcp))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(cors_layer(cors_origins))
}

/// Run the HTTP gateway using axum with proper HTTP/1.1 compliance.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let state = AppState::from_config(&config);
    serve_with_state(host, listener, state, &config.gateway.cors_origins).await
}

/// Serve a prepared [`AppState`] until Ctrl-C.
pub async fn serve_with_state(
    host: &str,
    listener: tokio::net::TcpListener,
    state: AppState,
    cors_origins: &[String],
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let display_addr = format!("{host}:{actual_port}");

    if !state.coordinator.classifier().provider().is_configured() {
        tracing::warn!(
            "No Gemini API key configured; frame analysis will fail until GEMINI_API_KEY or GOOGLE_API_KEY is set"
        );
    }

    println!("◆ NutriSight gateway listening on http://{display_addr}");
    println!("  POST /api/analyze-frame   analyze one camera frame");
    println!("  GET  /api/protocol        nutrition ledger");
    println!("  GET  /api/agent-state     tracking state");
    println!("  POST /api/reset-agent     reset state and ledger");
    println!("  POST /api/search-item     item lookup");
    println!("  GET  /api/smart-watch-data");
    println!("  POST /mcp                 tool protocol (JSON-RPC 2.0)");
    println!("  GET  /health");
    println!("  Ctrl+C to stop\n");
    tracing::info!(addr = %display_addr, "Gateway started");

    let app = build_app(state, cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Gateway shutting down");
        })
        .await?;

    Ok(())
}
