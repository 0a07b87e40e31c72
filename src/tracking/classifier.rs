use super::classification::ClassificationResult;
use super::state::HistoryEntry;
use crate::config::ClassifierConfig;
use crate::error::LlmError;
use crate::providers::{ChatRequest, Provider, ProviderMessage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

/// Detection policy sent as the system instruction with every frame.
pub const ACTION_DETECTION_PROMPT: &str = r#"You watch a camera feed and detect HEALTH activities. Detect only:

1. SUPPLEMENT: taking vitamins, pills or medication
2. FOOD: eating a meal, snack, fruit or any other food
3. HYDRATION: drinking water, juice, smoothies or other beverages
4. EXERCISE: stretching, yoga, push-ups or any other physical exercise

Ignore talking, typing, sitting still, facial expressions and phone use.

Earlier frames of the same action and your replies to them precede the newest
frame. Use them to judge whether the action has just started, is continuing
or has finished.

Reply with a single JSON object and nothing else.

While an action is "started" or "in progress":
{
  "status": "started" | "in progress",
  "action_type": "food" | "supplement" | "hydration" | "exercise",
  "title": "Short title",
  "description": "What is happening"
}

When the action is "finished", include full nutrition data:
{
  "status": "finished",
  "action_type": "food" | "supplement" | "hydration" | "exercise",
  "title": "Specific item, e.g. 'Medium Apple' or 'Vitamin D3 1000IU'",
  "description": "What was consumed or done",
  "macros": {
    "calories": <integer, negative for exercise>,
    "protein_g": <number>,
    "carbs_g": <number>,
    "fat_g": <number>,
    "fiber_g": <number>,
    "sugar_g": <number>,
    "water_ml": <integer, for hydration>
  },
  "micros": {
    "vitamin_a": "<amount if applicable>",
    "vitamin_c": "<amount if applicable>",
    "vitamin_d": "<amount if applicable>",
    "vitamin_e": "<amount if applicable>",
    "vitamin_b12": "<amount if applicable>",
    "calcium": "<amount if applicable>",
    "iron": "<amount if applicable>",
    "magnesium": "<amount if applicable>",
    "zinc": "<amount if applicable>",
    "omega_3": "<amount if applicable>",
    "other": ["<any other nutrients>"]
  },
  "details": {"quantity": "...", "dosage": "...", "brand": "..."}
}

When no health activity is visible:
{
  "status": "not detected",
  "action_type": "",
  "title": "",
  "description": "No health activity"
}

Nutrition estimates:
- FOOD: typical serving size, e.g. a medium apple is 95 kcal, 25 g carbs, 4 g fiber.
- SUPPLEMENT: 0 kcal; list vitamins and minerals under micros.
- HYDRATION: water is 0 kcal with water_ml set; estimate sugar and calories for juice.
- EXERCISE: negative calories for energy burned, e.g. 10 push-ups is about -30 kcal."#;

/// Folds one frame plus the in-flight history into a single classifier call.
pub struct ActionClassifier {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
}

/// One classifier round-trip: the parsed result plus the observation that
/// produced it, ready to be appended to history.
pub struct ClassifiedFrame {
    pub observation: HistoryEntry,
    pub result: ClassificationResult,
}

impl ActionClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &ClassifierConfig) -> Self {
        Self::new(provider, config.model.clone(), config.temperature)
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Classify `frame` in the context of `history`.
    ///
    /// Only transport and credential failures are errors. A malformed reply
    /// yields an `unknown` classification.
    pub async fn classify(
        &self,
        frame: &[u8],
        history: &[HistoryEntry],
    ) -> Result<ClassifiedFrame, LlmError> {
        if !self.provider.is_configured() {
            return Err(LlmError::NotConfigured {
                provider: self.provider.name().to_string(),
            });
        }

        let observation = HistoryEntry::Observation {
            media_type: crate::media::detect_image_mime(frame),
            data: STANDARD.encode(frame),
        };

        let mut messages: Vec<ProviderMessage> = history
            .iter()
            .map(HistoryEntry::to_provider_message)
            .collect();
        messages.push(observation.to_provider_message());

        let mut request = ChatRequest::new(&messages, &self.model, self.temperature)
            .with_system(ACTION_DETECTION_PROMPT);
        request.json_output = true;

        let raw = self
            .provider
            .chat(request)
            .await
            .map_err(|error| into_llm_error(self.provider.name(), error))?;

        tracing::debug!(
            provider = self.provider.name(),
            history = history.len(),
            reply_chars = raw.len(),
            "Classifier replied"
        );

        Ok(ClassifiedFrame {
            observation,
            result: ClassificationResult::parse(&raw),
        })
    }
}

fn into_llm_error(provider: &str, error: anyhow::Error) -> LlmError {
    match error.downcast::<LlmError>() {
        Ok(llm_error) => llm_error,
        Err(other) => LlmError::Request {
            provider: provider.to_string(),
            message: format!("{other:#}"),
        },
    }
}
