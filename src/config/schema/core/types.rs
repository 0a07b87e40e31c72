use super::super::{ClassifierConfig, EnrichmentConfig, GatewayConfig, TrackingConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(".nutrisight").join("config.toml"),
            gateway: GatewayConfig::default(),
            classifier: ClassifierConfig::default(),
            tracking: TrackingConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.classifier.temperature) {
            return Err(ConfigError::Validation(format!(
                "classifier.temperature must be within 0.0..=2.0 (got {})",
                self.classifier.temperature
            )));
        }
        if self.tracking.frame_buffer_capacity == 0 {
            return Err(ConfigError::Validation(
                "tracking.frame_buffer_capacity must be at least 1".into(),
            ));
        }
        if self.classifier.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "classifier.model must not be empty".into(),
            ));
        }
        Ok(())
    }
}
