//! Typed configuration with TOML loading.

use crate::map::MapConfig;
use crate::position::PositionConfig;
use crate::routing::RoutingConfig;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level navigation configuration. Every section has sensible defaults;
/// a missing file or section is not an error for callers that use
/// `NavConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavConfig {
    /// Position source settings
    #[serde(default)]
    pub position: PositionConfig,
    /// Directions provider settings
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Session controller settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Map surface settings
    #[serde(default)]
    pub map: MapConfig,
    /// Backend base URL for best-effort trip logging, if enabled
    #[serde(default)]
    pub trip_log_base_url: Option<String>,
}

impl NavConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();
        assert_eq!(config.position.acquire_timeout_secs, 15);
        assert_eq!(config.map.triple_click_window_ms, 500);
        assert_eq!(config.session.noise_floor_km, 0.001);
        assert_eq!(config.routing.profile, "driving");
        assert!(config.trip_log_base_url.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            trip_log_base_url = "https://api.example.test"

            [routing]
            access_token = "tok"
            profile = "driving"
            base_url = "https://directions.example.test"
            request_timeout_secs = 5

            [map]
            triple_click_window_ms = 400
            auto_center_default = false
        "#;
        let config: NavConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.routing.access_token, "tok");
        assert_eq!(config.map.triple_click_window_ms, 400);
        assert!(!config.map.auto_center_default);
        // Untouched sections keep their defaults
        assert_eq!(config.position.watch_timeout_secs, 10);
        assert_eq!(config.session.thresholds.len(), 4);
    }
}
