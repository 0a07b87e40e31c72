//! The frame-sequence state machine.
//!
//! Each submitted frame is classified against the in-flight history and the
//! result drives one lifecycle transition:
//!
//! | classification | effect |
//! |---|---|
//! | `started` | history and buffer restart with this exchange |
//! | `in progress` | exchange appended, label kept unless a new one arrives |
//! | `finished` | entry committed to the ledger, history and buffer cleared |
//! | `not detected` / `unknown` | stage untouched; exchange kept only while an action is active |
//!
//! All of it happens under one async mutex, so two frames never interleave
//! their transitions even though the classifier call is awaited.

use super::classification::{ClassificationResult, ClassificationStatus};
use super::classifier::{ActionClassifier, ClassifiedFrame};
use super::frame_buffer::FrameBuffer;
use super::ledger::{ActionLedger, LedgerEntry, LedgerSummary};
use super::state::{LifecycleStage, StateSnapshot, TrackingState};
use crate::error::LlmError;
use serde::Serialize;
use tokio::sync::Mutex;

struct Session {
    state: TrackingState,
    ledger: ActionLedger,
    buffer: FrameBuffer,
}

/// Result of one [`FrameCoordinator::process_frame`] cycle.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub classification: ClassificationResult,
    /// Entry committed by this frame, when it finished an action.
    pub committed: Option<LedgerEntry>,
    pub frames_buffered: usize,
    /// Frames captured for the action this frame finished.
    pub frames_analyzed: Option<usize>,
    pub summary: LedgerSummary,
    pub state: StateSnapshot,
}

impl FrameOutcome {
    pub fn raw_text(&self) -> &str {
        &self.classification.raw
    }

    pub fn is_completed(&self) -> bool {
        self.committed.is_some()
    }

    /// Item name and category to enrich a completed action with. The item
    /// name wins over the committed title.
    pub fn enrichment_target(&self) -> Option<(&str, &str)> {
        let entry = self.committed.as_ref()?;
        let name = match self.classification.item_name.trim() {
            "" => entry.title.as_str(),
            item => item,
        };
        Some((name, entry.action_type.as_str()))
    }
}

/// Point-in-time view of the coordinator for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub current_action: String,
    pub action_progress: LifecycleStage,
    pub frames_buffered: usize,
    #[serde(skip)]
    pub history_len: usize,
    #[serde(rename = "protocol")]
    pub summary: LedgerSummary,
}

pub struct FrameCoordinator {
    classifier: ActionClassifier,
    session: Mutex<Session>,
}

impl FrameCoordinator {
    pub fn new(classifier: ActionClassifier, buffer_capacity: usize) -> Self {
        Self {
            classifier,
            session: Mutex::new(Session {
                state: TrackingState::new(),
                ledger: ActionLedger::new(),
                buffer: FrameBuffer::new(buffer_capacity),
            }),
        }
    }

    pub fn classifier(&self) -> &ActionClassifier {
        &self.classifier
    }

    /// Run one frame through the classifier and apply the transition.
    ///
    /// Only upstream transport and credential failures are errors; in that
    /// case nothing is mutated.
    pub async fn process_frame(&self, frame: &[u8]) -> Result<FrameOutcome, LlmError> {
        let mut session = self.session.lock().await;
        tracing::info!(bytes = frame.len(), "Analyzing frame");

        let ClassifiedFrame {
            observation,
            result,
        } = self
            .classifier
            .classify(frame, session.state.history())
            .await
            .inspect_err(|error| tracing::warn!(%error, "Frame classification failed"))?;

        let Session {
            state,
            ledger,
            buffer,
        } = &mut *session;
        let previous = state.stage();
        let mut committed = None;
        let mut frames_analyzed = None;

        match result.status {
            ClassificationStatus::Started => {
                state.clear_history();
                buffer.clear();
                state.push_update(&result.title, LifecycleStage::Started);
                state.set_category(&result.action_type);
                state.record_exchange(observation, &result.raw);
                buffer.push(frame);
            }
            ClassificationStatus::InProgress => {
                if !previous.is_active() {
                    tracing::debug!("In-progress frame while idle; treating as implicit start");
                }
                state.record_exchange(observation, &result.raw);
                state.push_update(&result.title, LifecycleStage::InProgress);
                if !result.action_type.is_empty() {
                    state.set_category(&result.action_type);
                }
                buffer.push(frame);
            }
            ClassificationStatus::Finished => {
                state.push_update(&result.title, LifecycleStage::Finished);
                // Missing labels carry over only from the action being closed.
                let mut finished = result.clone();
                if previous.is_active() {
                    if finished.title.is_empty() {
                        finished.title = state.current_action().to_string();
                    }
                    if finished.action_type.is_empty() {
                        finished.action_type = state.current_category().to_string();
                    }
                }
                let entry = ledger.record(&finished);
                tracing::info!(
                    id = %entry.id,
                    action_type = %entry.action_type,
                    title = %entry.title,
                    calories = entry.macros.calories,
                    "Action committed"
                );
                committed = Some(entry);
                frames_analyzed = Some(buffer.len());
                buffer.clear();
                state.clear_history();
            }
            ClassificationStatus::NotDetected | ClassificationStatus::Unknown => {
                if previous.is_active() {
                    state.record_exchange(observation, &result.raw);
                } else if result.status == ClassificationStatus::NotDetected
                    && !buffer.is_empty()
                {
                    tracing::debug!(frames = buffer.len(), "Dropping stale buffered frames");
                    buffer.clear();
                }
            }
        }

        if state.stage() != previous {
            tracing::info!(
                from = %previous,
                to = %state.stage(),
                action = state.current_action(),
                "Lifecycle transition"
            );
        }

        Ok(FrameOutcome {
            frames_buffered: buffer.len(),
            frames_analyzed,
            committed,
            summary: ledger.summary(),
            state: state.snapshot(),
            classification: result,
        })
    }

    pub async fn snapshot(&self) -> AgentSnapshot {
        let session = self.session.lock().await;
        AgentSnapshot {
            current_action: session.state.current_action().to_string(),
            action_progress: session.state.stage(),
            frames_buffered: session.buffer.len(),
            history_len: session.state.history().len(),
            summary: session.ledger.summary(),
        }
    }

    pub async fn summary(&self) -> LedgerSummary {
        self.session.lock().await.ledger.summary()
    }

    /// Hard reset: tracking state, frame buffer and ledger.
    pub async fn reset(&self) {
        let mut session = self.session.lock().await;
        session.state.reset();
        session.buffer.clear();
        session.ledger.clear();
        tracing::info!("Tracking state and ledger reset");
    }
}
