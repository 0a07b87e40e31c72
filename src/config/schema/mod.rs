mod classifier;
mod core;
mod gateway;

pub use classifier::{ClassifierConfig, EnrichmentConfig, TrackingConfig};
pub use core::Config;
pub use gateway::GatewayConfig;
