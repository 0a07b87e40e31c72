use serde::{Deserialize, Serialize};

/// Inference service settings for frame classification and enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Gemini API key; usually supplied through the environment instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            api_base_url: default_api_base_url(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Raw frames retained for diagnostics while an action is in flight.
    #[serde(default = "default_frame_buffer_capacity")]
    pub frame_buffer_capacity: usize,
}

fn default_frame_buffer_capacity() -> usize {
    20
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            frame_buffer_capacity: default_frame_buffer_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ask Gemini to ground the lookup with Google Search.
    #[serde(default = "default_true")]
    pub grounded_search: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grounded_search: true,
        }
    }
}
