//! Simulated smart-watch readings.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use serde_json::{Map, Value};

const STRESS_LEVELS: [&str; 3] = ["low", "moderate", "high"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchData {
    pub heart_rate_bpm: u32,
    pub blood_oxygen_spo2: f64,
    pub sleep_score: u32,
    pub steps_today: u32,
    pub calories_burned: u32,
    pub stress_level: String,
    pub body_temperature_f: f64,
    pub respiratory_rate: u32,
    pub hrv_ms: u32,
    pub active_minutes: u32,
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl WatchData {
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            heart_rate_bpm: rng.random_range(58..=102),
            blood_oxygen_spo2: round_tenths(rng.random_range(95.0..=100.0)),
            sleep_score: rng.random_range(55..=98),
            steps_today: rng.random_range(800..=14_000),
            calories_burned: rng.random_range(120..=2_800),
            stress_level: STRESS_LEVELS
                .choose(rng)
                .copied()
                .unwrap_or("moderate")
                .to_string(),
            body_temperature_f: round_tenths(rng.random_range(97.0..=99.2)),
            respiratory_rate: rng.random_range(12..=20),
            hrv_ms: rng.random_range(20..=80),
            active_minutes: rng.random_range(0..=180),
        }
    }
}

/// Generate a snapshot and merge `overrides` over it key by key.
///
/// Overrides that are not a JSON object are ignored.
pub fn watch_snapshot(overrides: Option<&Value>) -> Map<String, Value> {
    let mut data = match serde_json::to_value(WatchData::generate()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Some(Value::Object(overrides)) = overrides {
        for (key, value) in overrides {
            data.insert(key.clone(), value.clone());
        }
    }
    data
}

/// Like [`watch_snapshot`] but takes the override as raw JSON text.
/// Malformed text is logged and ignored.
pub fn watch_snapshot_from_str(overrides: Option<&str>) -> Map<String, Value> {
    let parsed = overrides
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| match serde_json::from_str::<Value>(raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(%error, "Ignoring malformed watch-data override");
                None
            }
        });
    watch_snapshot(parsed.as_ref())
}
