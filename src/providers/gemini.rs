//! Google Gemini `generateContent` provider.
//!
//! Frames are sent as `inlineData` parts and prior classifier replies as
//! `model` turns, so the service sees the whole in-flight action as one
//! conversation.

use super::gemini_types::{
    Content, GeminiTool, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleSearch, Part,
};
use super::http_client::build_provider_client_with_timeout;
use super::response::{ContentBlock, MessageRole, ProviderMessage};
use super::traits::{ChatRequest, Provider};
use crate::config::ClassifierConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

const PROVIDER_NAME: &str = "gemini";
const MAX_ERROR_BODY_CHARS: usize = 300;

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    max_output_tokens: u32,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            api_key: api_key
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(String::from),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_output_tokens: 8192,
            client: build_provider_client_with_timeout(120),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        let mut provider = Self::new(config.api_key.as_deref(), &config.api_base_url);
        provider.max_output_tokens = config.max_output_tokens;
        provider.client = build_provider_client_with_timeout(config.request_timeout_secs);
        provider
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn map_message(message: &ProviderMessage) -> Content {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };
        let parts = message
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => Part::text(text.clone()),
                ContentBlock::Image { media_type, data } => {
                    Part::inline_data(media_type.clone(), data.clone())
                }
            })
            .collect();

        Content {
            role: Some(role.to_string()),
            parts,
        }
    }

    fn build_request(&self, request: &ChatRequest<'_>) -> GenerateContentRequest {
        // Search grounding and JSON mode cannot be combined.
        let response_mime_type = (request.json_output && !request.grounded_search)
            .then(|| "application/json".to_string());

        GenerateContentRequest {
            contents: request.messages.iter().map(Self::map_message).collect(),
            system_instruction: request.system_prompt.map(|system| Content {
                role: None,
                parts: vec![Part::text(system)],
            }),
            tools: request.grounded_search.then(|| {
                vec![GeminiTool {
                    google_search: GoogleSearch {},
                }]
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type,
            },
        }
    }

    fn extract_text(result: &GenerateContentResponse) -> String {
        let Some(candidate) = result.candidates.as_ref().and_then(|c| c.first()) else {
            tracing::debug!("Gemini reply carried no candidates");
            return String::new();
        };
        if let Some(reason) = candidate.finish_reason.as_deref()
            && reason != "STOP"
        {
            tracing::debug!(finish_reason = reason, "Gemini reply finished early");
        }

        candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string()
            })
            .unwrap_or_default()
    }

    async fn call_api(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| LlmError::NotConfigured {
            provider: PROVIDER_NAME.into(),
        })?;

        let url = format!(
            "{}/{}:generateContent",
            self.base_url,
            Self::model_name(model)
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|error| LlmError::Request {
                provider: PROVIDER_NAME.into(),
                message: error.without_url().to_string(),
            })?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(LlmError::Auth {
                provider: PROVIDER_NAME.into(),
            }
            .into());
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error_text: String = error_text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(LlmError::Request {
                provider: PROVIDER_NAME.into(),
                message: format!("Gemini API error ({status}): {error_text}"),
            }
            .into());
        }

        let result: GenerateContentResponse =
            response.json().await.map_err(|error| LlmError::Request {
                provider: PROVIDER_NAME.into(),
                message: format!("undecodable Gemini envelope: {}", error.without_url()),
            })?;

        if let Some(err) = result.error.as_ref() {
            return Err(LlmError::Request {
                provider: PROVIDER_NAME.into(),
                message: format!("Gemini API error: {}", err.message),
            }
            .into());
        }

        Ok(result)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<String> {
        let body = self.build_request(&request);
        let result = self.call_api(request.model, &body).await?;
        Ok(Self::extract_text(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn ask(provider: &GeminiProvider, model: &str) -> anyhow::Result<String> {
        let messages = [ProviderMessage::user("hello")];
        provider.chat(ChatRequest::new(&messages, model, 0.2)).await
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn blank_key_counts_as_unconfigured() {
        let provider = GeminiProvider::new(Some("  "), "http://localhost");
        assert!(!provider.is_configured());
        assert!(GeminiProvider::new(Some("k"), "http://localhost").is_configured());
    }

    #[test]
    fn model_name_formatting() {
        assert_eq!(
            GeminiProvider::model_name("gemini-2.0-flash"),
            "models/gemini-2.0-flash"
        );
        assert_eq!(
            GeminiProvider::model_name("models/gemini-1.5-pro"),
            "models/gemini-1.5-pro"
        );
    }

    #[test]
    fn request_maps_roles_and_inline_images() {
        let provider = GeminiProvider::new(Some("k"), "http://localhost");
        let messages = [
            ProviderMessage::user_image("image/jpeg", "AAAA"),
            ProviderMessage::assistant("{\"status\":\"started\"}"),
            ProviderMessage::user_image("image/png", "BBBB"),
        ];
        let mut request = ChatRequest::new(&messages, "gemini-2.0-flash", 0.2).with_system("detect");
        request.json_output = true;

        let value = serde_json::to_value(provider.build_request(&request)).unwrap();

        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["parts"][0]["inlineData"]["data"], "BBBB");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "detect");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn grounded_request_adds_search_tool_without_json_mode() {
        let provider = GeminiProvider::new(Some("k"), "http://localhost");
        let messages = [ProviderMessage::user("vitamin d")];
        let mut request = ChatRequest::new(&messages, "m", 0.2);
        request.json_output = true;
        request.grounded_search = true;

        let value = serde_json::to_value(provider.build_request(&request)).unwrap();

        assert!(value["tools"][0].get("google_search").is_some());
        assert!(value["generationConfig"].get("responseMimeType").is_none());
    }

    #[tokio::test]
    async fn chat_sends_key_header_and_joins_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("{\"status\":\"not detected\"}")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Some("test-key"), &server.uri());
        let text = ask(&provider, "gemini-2.0-flash")
            .await
            .unwrap();

        assert_eq!(text, "{\"status\":\"not detected\"}");
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let provider = GeminiProvider::new(None, "http://127.0.0.1:9");
        let err = ask(&provider, "m")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LlmError>(),
            Some(LlmError::NotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn forbidden_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Some("bad"), &server.uri());
        let err = ask(&provider, "m")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LlmError>(),
            Some(LlmError::Auth { .. })
        ));
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Some("k"), &server.uri());
        let err = ask(&provider, "m")
            .await
            .unwrap_err()
            .to_string();

        assert!(err.contains("503"));
        assert!(err.contains("overloaded"));
    }

    #[tokio::test]
    async fn reply_without_candidates_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Some("k"), &server.uri());
        let text = ask(&provider, "m")
            .await
            .unwrap();

        assert!(text.is_empty());
    }
}
