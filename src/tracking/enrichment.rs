use super::classification::strip_code_fence;
use super::nutrients::coerce;
use crate::config::EnrichmentConfig;
use crate::providers::{ChatRequest, Provider, ProviderMessage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Item names the classifier uses when it could not name anything.
const PLACEHOLDER_NAMES: &[&str] = &["unknown", "none", "n/a", "activity", "health action"];

const ENRICHMENT_SYSTEM_PROMPT: &str = "You are a concise health reference. Answer with a single \
JSON object and nothing else, using exactly these keys: item_name (string), health_benefits \
(array of strings), recommended_usage (string), warnings (array of strings), fun_fact (string), \
calories (string, optional).";

/// Descriptive information about a detected item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentInfo {
    #[serde(default, deserialize_with = "coerce::text")]
    pub item_name: String,
    #[serde(default, deserialize_with = "coerce::text_list")]
    pub health_benefits: Vec<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub recommended_usage: String,
    #[serde(default, deserialize_with = "coerce::text_list")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub fun_fact: String,
    #[serde(
        default,
        deserialize_with = "optional_calories",
        skip_serializing_if = "Option::is_none"
    )]
    pub calories: Option<String>,
}

fn optional_calories<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = coerce::text(deserializer)?;
    Ok((!text.trim().is_empty()).then_some(text))
}

/// Side-channel lookup that never touches tracking state or the ledger.
pub struct EnrichmentLookup {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    config: EnrichmentConfig,
}

impl EnrichmentLookup {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f64,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            config,
        }
    }

    /// Look up `item_name`. Every failure (disabled, placeholder name,
    /// upstream error, unparseable reply) is `None`.
    pub async fn lookup(&self, item_name: &str, category: &str) -> Option<EnrichmentInfo> {
        let item_name = item_name.trim();
        if !self.config.enabled || is_placeholder(item_name) {
            return None;
        }
        if !self.provider.is_configured() {
            tracing::debug!("Enrichment skipped: provider not configured");
            return None;
        }

        let messages = [ProviderMessage::user(build_query(item_name, category))];
        let mut request = ChatRequest::new(&messages, &self.model, self.temperature)
            .with_system(ENRICHMENT_SYSTEM_PROMPT);
        request.json_output = true;
        request.grounded_search = self.config.grounded_search;

        let raw = match self.provider.chat(request).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(item = item_name, error = %error, "Enrichment lookup failed");
                return None;
            }
        };

        let mut info = parse_info(&raw)?;
        if info.item_name.trim().is_empty() {
            info.item_name = item_name.to_string();
        }
        tracing::debug!(item = item_name, category, "Enrichment lookup succeeded");
        Some(info)
    }
}

fn is_placeholder(item_name: &str) -> bool {
    item_name.is_empty()
        || PLACEHOLDER_NAMES
            .iter()
            .any(|placeholder| item_name.eq_ignore_ascii_case(placeholder))
}

fn build_query(item_name: &str, category: &str) -> String {
    match category.trim().to_ascii_lowercase().as_str() {
        "supplement" | "medication" => format!(
            "Summarize the supplement \"{item_name}\": its main health benefits, typical \
             recommended dosage and timing, known interactions or warnings, and one fun fact."
        ),
        "food" | "meal" | "snack" => format!(
            "Summarize the food \"{item_name}\": its main health benefits, a sensible serving \
             size, calories per typical serving, any warnings such as common allergens, and one \
             fun fact."
        ),
        "hydration" | "drink" | "beverage" => format!(
            "Summarize the drink \"{item_name}\": its hydration and health benefits, how much is \
             reasonable per day, calories per typical serving, any warnings, and one fun fact."
        ),
        "exercise" => format!(
            "Summarize the exercise \"{item_name}\": its health benefits, a recommended routine \
             for beginners, approximate calories burned per session, safety warnings, and one \
             fun fact."
        ),
        other => {
            let category = if other.is_empty() { "wellness" } else { other };
            format!(
                "Summarize \"{item_name}\" ({category}): its health benefits, recommended usage, \
                 any warnings, and one fun fact."
            )
        }
    }
}

fn parse_info(raw: &str) -> Option<EnrichmentInfo> {
    let body = strip_code_fence(raw);
    // Grounded replies may wrap the object in prose.
    let body = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    };
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value @ serde_json::Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => {
            tracing::debug!("Enrichment reply was not a JSON object");
            None
        }
    }
}
