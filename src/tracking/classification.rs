//! Parsing of classifier replies into [`ClassificationResult`].
//!
//! Parsing never fails. A reply that is not a JSON object (after an optional
//! markdown fence is stripped) becomes an `Unknown` result that carries the
//! raw text as its description.

use super::nutrients::{Macros, Micros, coerce};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum ClassificationStatus {
    #[serde(rename = "started")]
    #[strum(serialize = "started")]
    Started,
    #[serde(rename = "in progress")]
    #[strum(serialize = "in progress")]
    InProgress,
    #[serde(rename = "finished")]
    #[strum(serialize = "finished")]
    Finished,
    #[serde(rename = "not detected")]
    #[strum(serialize = "not detected")]
    NotDetected,
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl ClassificationStatus {
    /// Map the wire status. A missing status means nothing was seen; a status
    /// outside the vocabulary is `Unknown`.
    pub fn from_wire(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return Self::NotDetected;
        };
        match status.trim().to_ascii_lowercase().replace('_', " ").as_str() {
            "started" => Self::Started,
            "in progress" => Self::InProgress,
            "finished" => Self::Finished,
            "not detected" | "" => Self::NotDetected,
            _ => Self::Unknown,
        }
    }
}

/// Free-form supplement/food details. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
    #[serde(default, deserialize_with = "coerce::text")]
    pub quantity: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub dosage: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub brand: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub status: ClassificationStatus,
    /// Display title of the action. Empty when the reply carried none.
    pub title: String,
    pub action_type: String,
    pub item_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<Macros>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub micros: Option<Micros>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    /// The parsed reply object, or `{"status":"unknown","description":raw}`
    /// when the reply was not JSON.
    #[serde(skip)]
    pub payload: Value,
    #[serde(skip)]
    pub raw: String,
}

#[derive(Deserialize)]
struct WirePayload {
    #[serde(default, deserialize_with = "optional_text")]
    status: Option<String>,
    #[serde(default, deserialize_with = "coerce::text")]
    title: String,
    #[serde(default, deserialize_with = "coerce::text")]
    action: String,
    #[serde(default, deserialize_with = "coerce::text")]
    item_name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    action_type: String,
    #[serde(default, deserialize_with = "coerce::text")]
    category: String,
    #[serde(default, deserialize_with = "coerce::text")]
    description: String,
    #[serde(default, deserialize_with = "coerce::lenient")]
    macros: Option<Macros>,
    #[serde(default, deserialize_with = "coerce::lenient")]
    micros: Option<Micros>,
    #[serde(default, deserialize_with = "coerce::lenient")]
    details: Option<Details>,
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then(|| coerce::text_from_value(&value)))
}

fn first_non_empty(candidates: [&str; 3]) -> String {
    candidates
        .into_iter()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Remove a surrounding markdown code fence (```` ```json ```` or bare
/// ```` ``` ````) and whitespace.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

impl ClassificationResult {
    pub fn parse(raw: &str) -> Self {
        let body = strip_code_fence(raw);
        let payload = match serde_json::from_str::<Value>(body) {
            Ok(value @ Value::Object(_)) => value,
            _ => return Self::unknown(raw),
        };
        // Every field coerces, so an object always fits the wire shape.
        let Ok(wire) = serde_json::from_value::<WirePayload>(payload.clone()) else {
            return Self::unknown(raw);
        };

        Self {
            status: ClassificationStatus::from_wire(wire.status.as_deref()),
            title: first_non_empty([
                wire.title.as_str(),
                wire.action.as_str(),
                wire.item_name.as_str(),
            ]),
            action_type: first_non_empty([wire.action_type.as_str(), wire.category.as_str(), ""]),
            item_name: wire.item_name.trim().to_string(),
            description: wire.description,
            macros: wire.macros,
            micros: wire.micros,
            details: wire.details,
            payload,
            raw: raw.to_string(),
        }
    }

    fn unknown(raw: &str) -> Self {
        Self {
            status: ClassificationStatus::Unknown,
            title: String::new(),
            action_type: String::new(),
            item_name: String::new(),
            description: raw.to_string(),
            macros: None,
            micros: None,
            details: None,
            payload: serde_json::json!({"status": "unknown", "description": raw}),
            raw: raw.to_string(),
        }
    }
}
