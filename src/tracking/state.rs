use crate::providers::ProviderMessage;
use serde::{Deserialize, Serialize};

/// Where the tracked action is in its detection cycle. `Finished` doubles as
/// the idle state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
pub enum LifecycleStage {
    #[serde(rename = "started")]
    #[strum(serialize = "started")]
    Started,
    #[serde(rename = "in progress")]
    #[strum(serialize = "in progress")]
    InProgress,
    #[default]
    #[serde(rename = "finished")]
    #[strum(serialize = "finished")]
    Finished,
}

impl LifecycleStage {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Started | Self::InProgress)
    }
}

/// One replayable exchange with the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// A submitted frame, base64 encoded.
    Observation { media_type: String, data: String },
    /// The classifier's raw reply to the preceding observation.
    Classification { raw: String },
}

impl HistoryEntry {
    pub fn to_provider_message(&self) -> ProviderMessage {
        match self {
            Self::Observation { media_type, data } => {
                ProviderMessage::user_image(media_type.clone(), data.clone())
            }
            Self::Classification { raw } => ProviderMessage::assistant(raw.clone()),
        }
    }
}

/// What is happening right now, plus the exchange trail for the in-flight
/// action.
#[derive(Debug, Clone, Default)]
pub struct TrackingState {
    current_action: String,
    current_category: String,
    stage: LifecycleStage,
    history: Vec<HistoryEntry>,
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_action(&self) -> &str {
        &self.current_action
    }

    /// Action type of the in-flight action, empty when unknown.
    pub fn current_category(&self) -> &str {
        &self.current_category
    }

    pub fn stage(&self) -> LifecycleStage {
        self.stage
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Set stage and label. An empty label keeps the current one.
    pub fn push_update(&mut self, label: &str, stage: LifecycleStage) {
        let label = label.trim();
        if !label.is_empty() {
            self.current_action = label.to_string();
        }
        self.stage = stage;
    }

    /// Replace the remembered action type.
    pub fn set_category(&mut self, category: &str) {
        self.current_category = category.trim().to_string();
    }

    /// Append one observation/classification pair.
    pub fn record_exchange(&mut self, observation: HistoryEntry, raw_reply: &str) {
        self.history.push(observation);
        self.history.push(HistoryEntry::Classification {
            raw: raw_reply.to_string(),
        });
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn reset(&mut self) {
        self.current_action.clear();
        self.current_category.clear();
        self.stage = LifecycleStage::Finished;
        self.history.clear();
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            current_action: self.current_action.clone(),
            action_progress: self.stage,
            history_len: self.history.len(),
        }
    }
}

/// Serializable view of [`TrackingState`] for API replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pub current_action: String,
    pub action_progress: LifecycleStage,
    #[serde(skip)]
    pub history_len: usize,
}
