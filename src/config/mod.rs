pub mod schema;

pub use schema::{ClassifierConfig, Config, EnrichmentConfig, GatewayConfig, TrackingConfig};
