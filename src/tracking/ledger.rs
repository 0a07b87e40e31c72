use super::classification::ClassificationResult;
use super::nutrients::{Macros, Micros};
use serde::Serialize;

const DEFAULT_ACTION_TYPE: &str = "food";
const DEFAULT_TITLE: &str = "Activity";
const EXERCISE: &str = "exercise";
const SUPPLEMENT: &str = "supplement";

/// One committed, finished action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: String,
    pub action_type: String,
    pub title: String,
    pub description: String,
    pub timestamp: String,
    pub macros: Macros,
    pub micros: Micros,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub calories_consumed: i64,
    pub calories_burned: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub water_ml: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_actions: usize,
    pub totals: Totals,
    pub net_calories: i64,
    pub supplements_taken: Vec<String>,
    pub items: Vec<LedgerEntry>,
}

/// Append-only record of completed actions.
#[derive(Debug)]
pub struct ActionLedger {
    entries: Vec<LedgerEntry>,
    next_id: u64,
}

impl Default for ActionLedger {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl ActionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a finished classification. Missing labels fall back to
    /// `food` / `Activity`; missing nutrient blocks are all zeros.
    pub fn record(&mut self, classification: &ClassificationResult) -> LedgerEntry {
        let action_type = match classification.action_type.trim() {
            "" => DEFAULT_ACTION_TYPE.to_string(),
            other => other.to_string(),
        };
        let title = match classification.title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            other => other.to_string(),
        };

        let entry = LedgerEntry {
            id: format!("action_{}", self.next_id),
            action_type,
            title,
            description: classification.description.clone(),
            timestamp: chrono::Local::now().to_rfc3339(),
            macros: classification.macros.clone().unwrap_or_default(),
            micros: classification.micros.clone().unwrap_or_default(),
            status: "completed".to_string(),
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        entry
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut totals = Totals::default();
        let mut supplements_taken = Vec::new();

        for entry in &self.entries {
            let macros = &entry.macros;
            if entry.action_type.eq_ignore_ascii_case(EXERCISE) {
                totals.calories_burned += macros.calories.saturating_abs();
            } else {
                totals.calories_consumed += macros.calories;
            }
            totals.protein_g += macros.protein_g;
            totals.carbs_g += macros.carbs_g;
            totals.fat_g += macros.fat_g;
            totals.fiber_g += macros.fiber_g;
            totals.sugar_g += macros.sugar_g;
            totals.water_ml += macros.water_ml;

            if entry.action_type.eq_ignore_ascii_case(SUPPLEMENT) {
                supplements_taken.push(entry.title.clone());
            }
        }

        LedgerSummary {
            total_actions: self.entries.len(),
            net_calories: totals.calories_consumed - totals.calories_burned,
            totals,
            supplements_taken,
            items: self.entries.clone(),
        }
    }

    /// Drop every entry and restart ids at `action_1`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 1;
    }
}
