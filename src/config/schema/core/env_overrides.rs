use super::Config;

fn first_non_empty(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Config {
    /// Environment variables win over the config file. Unparseable or
    /// out-of-range values are ignored and the file value is kept.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = first_non_empty(&["NUTRISIGHT_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"])
        {
            self.classifier.api_key = Some(key);
        }

        if let Some(model) = first_non_empty(&["NUTRISIGHT_MODEL", "LLM_MODEL"]) {
            self.classifier.model = model;
        }

        if let Some(temp_str) = first_non_empty(&["NUTRISIGHT_TEMPERATURE", "LLM_TEMPERATURE"])
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.classifier.temperature = temp;
        }

        if let Some(host) = first_non_empty(&["NUTRISIGHT_GATEWAY_HOST", "HOST"]) {
            self.gateway.host = host;
        }

        if let Some(port_str) = first_non_empty(&["NUTRISIGHT_GATEWAY_PORT", "PORT"])
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }
    }
}
