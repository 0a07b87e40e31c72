use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nutrisight::config::Config;
use nutrisight::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";
const JPEG_FRAME: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

struct GatewayTestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    async fn start(gemini: &MockServer, api_key: Option<&str>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.classifier.api_key = api_key.map(String::from);
        config.classifier.api_base_url = gemini.uri();
        config.classifier.request_timeout_secs = 10;

        let handle = tokio::spawn(async move {
            run_gateway_with_listener("127.0.0.1", listener, config).await
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            handle,
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

async fn mount_classifier_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("responseMimeType"))
        .respond_with(gemini_reply(text))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn frame_body(enrich: bool) -> Value {
    json!({
        "image_base64": format!("data:image/jpeg;base64,{}", STANDARD.encode(JPEG_FRAME)),
        "enrich_with_search": enrich,
    })
}

#[tokio::test]
async fn frames_drive_the_ledger_over_http() {
    let gemini = MockServer::start().await;
    mount_classifier_reply(
        &gemini,
        r#"{"status":"started","action_type":"supplement","title":"Vitamin D"}"#,
    )
    .await;
    mount_classifier_reply(
        &gemini,
        r#"{"status":"finished","action_type":"supplement","title":"Vitamin D3","item_name":"Vitamin D3","micros":{"vitamin_d":"25mcg"}}"#,
    )
    .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("google_search"))
        .respond_with(gemini_reply(
            "Here you go: {\"item_name\":\"Vitamin D3\",\"health_benefits\":[\"bone health\"],\"recommended_usage\":\"with a meal\",\"warnings\":[],\"fun_fact\":\"made in skin\"}",
        ))
        .expect(1)
        .mount(&gemini)
        .await;

    let gateway = GatewayTestServer::start(&gemini, Some("test-key")).await;
    let client = reqwest::Client::new();

    let started: Value = client
        .post(gateway.url("/api/analyze-frame"))
        .json(&frame_body(true))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["action_in_progress"], true);
    assert_eq!(started["agent_state"]["current_action"], "Vitamin D");

    let finished = client
        .post(gateway.url("/api/analyze-frame"))
        .json(&frame_body(true))
        .send()
        .await
        .unwrap();
    assert_eq!(finished.status(), StatusCode::OK);
    let finished: Value = finished.json().await.unwrap();
    assert_eq!(finished["action_completed"], true);
    assert_eq!(finished["detected_action"], "Vitamin D3");
    assert_eq!(finished["search_info"]["recommended_usage"], "with a meal");

    let protocol: Value = client
        .get(gateway.url("/api/protocol"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(protocol["total_actions"], 1);
    assert_eq!(protocol["supplements_taken"][0], "Vitamin D3");
    assert_eq!(protocol["items"][0]["micros"]["vitamin_d"], "25mcg");

    gemini.verify().await;
}

#[tokio::test]
async fn rejected_credentials_surface_as_server_error() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&gemini)
        .await;

    let gateway = GatewayTestServer::start(&gemini, Some("test-key")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(gateway.url("/api/analyze-frame"))
        .json(&frame_body(false))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let state: Value = client
        .get(gateway.url("/api/agent-state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["action_progress"], "finished");
    assert_eq!(state["frames_buffered"], 0);
}

#[tokio::test]
async fn missing_key_never_reaches_upstream() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(gemini_reply("{}"))
        .expect(0)
        .mount(&gemini)
        .await;

    let gateway = GatewayTestServer::start(&gemini, None).await;
    let response = reqwest::Client::new()
        .post(gateway.url("/api/analyze-frame"))
        .json(&frame_body(false))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    gemini.verify().await;
}

#[tokio::test]
async fn malformed_requests_are_client_errors() {
    let gemini = MockServer::start().await;
    let gateway = GatewayTestServer::start(&gemini, Some("test-key")).await;
    let client = reqwest::Client::new();

    let missing_field = client
        .post(gateway.url("/api/analyze-frame"))
        .json(&json!({"image": "AAAA"}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);

    let missing_name = client
        .post(gateway.url("/api/search-item"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_name.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn service_routes_and_cors() {
    let gemini = MockServer::start().await;
    let gateway = GatewayTestServer::start(&gemini, Some("test-key")).await;
    let client = reqwest::Client::new();

    let health = client
        .get(gateway.url("/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(
        health
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    let watch: Value = client
        .get(gateway.url("/api/smart-watch-data"))
        .query(&[("override", r#"{"sleep_hours":8.0}"#)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(watch["sleep_hours"], 8.0);
    let heart_rate = watch["heart_rate_bpm"].as_u64().unwrap();
    assert!((58..=102).contains(&heart_rate));

    let listed: Value = client
        .post(gateway.url("/mcp"))
        .json(&json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["id"], 7);
    assert_eq!(listed["result"]["tools"].as_array().unwrap().len(), 6);
}
