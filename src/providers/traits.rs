use super::response::ProviderMessage;
use async_trait::async_trait;

/// One multi-turn request to an inference provider.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system_prompt: Option<&'a str>,
    pub messages: &'a [ProviderMessage],
    pub model: &'a str,
    pub temperature: f64,
    /// Ask the provider for a bare JSON reply.
    pub json_output: bool,
    /// Let the provider ground its answer with a web search.
    pub grounded_search: bool,
}

impl<'a> ChatRequest<'a> {
    pub fn new(messages: &'a [ProviderMessage], model: &'a str, temperature: f64) -> Self {
        Self {
            system_prompt: None,
            messages,
            model,
            temperature,
            json_output: false,
            grounded_search: false,
        }
    }

    pub fn with_system(mut self, system_prompt: &'a str) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Whether credentials are present. Requests against an unconfigured
    /// provider are rejected before any network call.
    fn is_configured(&self) -> bool {
        true
    }

    /// Send a multi-turn request and return the reply text.
    ///
    /// An empty string is a valid reply. Transport and authentication
    /// failures are errors; authentication failures carry an
    /// [`LlmError::Auth`](crate::error::LlmError::Auth) that callers may
    /// downcast.
    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<String>;
}
