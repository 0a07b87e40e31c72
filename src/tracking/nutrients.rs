//! Macro/micronutrient value objects and the lenient field coercion used when
//! reading them out of classifier replies.
//!
//! Every field falls back to its zero value (`0`, `0.0`, `""`, `[]`) when it is
//! absent, `null`, or of the wrong shape. Deserializing these types never fails.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    #[serde(default, deserialize_with = "coerce::int")]
    pub calories: i64,
    #[serde(default, deserialize_with = "coerce::float")]
    pub protein_g: f64,
    #[serde(default, deserialize_with = "coerce::float")]
    pub carbs_g: f64,
    #[serde(default, deserialize_with = "coerce::float")]
    pub fat_g: f64,
    #[serde(default, deserialize_with = "coerce::float")]
    pub fiber_g: f64,
    #[serde(default, deserialize_with = "coerce::float")]
    pub sugar_g: f64,
    #[serde(default, deserialize_with = "coerce::int")]
    pub water_ml: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Micros {
    #[serde(default, deserialize_with = "coerce::text")]
    pub vitamin_a: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub vitamin_c: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub vitamin_d: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub vitamin_e: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub vitamin_b12: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub calcium: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub iron: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub magnesium: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub zinc: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub omega_3: String,
    #[serde(default, deserialize_with = "coerce::text_list")]
    pub other: Vec<String>,
}

/// Field-level coercion rules shared by every classifier payload type.
pub(crate) mod coerce {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Integer fields: JSON integers as-is, JSON floats truncated toward zero,
    /// strings only when they parse as a whole integer. Anything else is `0`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn int_from_value(value: &Value) -> i64 {
        match value {
            Value::Number(number) => number
                .as_i64()
                .unwrap_or_else(|| number.as_f64().map_or(0, |f| f as i64)),
            Value::String(text) => text.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Float fields: any JSON number, or a string that parses as a finite
    /// float. Anything else is `0.0`.
    pub(crate) fn float_from_value(value: &Value) -> f64 {
        let parsed = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
    }

    /// Text fields: strings as-is, numbers and booleans rendered, `null` and
    /// containers empty.
    pub(crate) fn text_from_value(value: &Value) -> String {
        match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        }
    }

    pub(crate) fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(int_from_value(&Value::deserialize(deserializer)?))
    }

    pub(crate) fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(float_from_value(&Value::deserialize(deserializer)?))
    }

    pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(text_from_value(&Value::deserialize(deserializer)?))
    }

    /// Lists of text: arrays keep their non-empty rendered items, a lone
    /// string becomes a one-item list, anything else is empty.
    pub(crate) fn text_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .iter()
                .map(text_from_value)
                .filter(|item| !item.is_empty())
                .collect(),
            Value::String(text) if !text.trim().is_empty() => vec![text],
            _ => Vec::new(),
        };
        Ok(items)
    }

    /// Nested objects: a value of the wrong shape becomes `None` instead of
    /// failing the enclosing payload.
    pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: serde::de::DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }
}
