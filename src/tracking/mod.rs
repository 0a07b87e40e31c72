pub mod classification;
pub mod classifier;
pub mod coordinator;
pub mod enrichment;
pub mod frame_buffer;
pub mod ledger;
pub mod nutrients;
pub mod state;

pub use classification::{ClassificationResult, ClassificationStatus, Details};
pub use classifier::{ACTION_DETECTION_PROMPT, ActionClassifier};
pub use coordinator::{AgentSnapshot, FrameCoordinator, FrameOutcome};
pub use enrichment::{EnrichmentInfo, EnrichmentLookup};
pub use frame_buffer::FrameBuffer;
pub use ledger::{ActionLedger, LedgerEntry, LedgerSummary, Totals};
pub use nutrients::{Macros, Micros};
pub use state::{HistoryEntry, LifecycleStage, StateSnapshot, TrackingState};
