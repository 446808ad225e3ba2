//! Position source types: fixes, states, errors, configuration.

use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single reported device location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Location in canonical (lat, lng)
    pub coordinate: Coordinate,
    /// Ground speed in m/s, if the platform reported one
    pub speed: Option<f64>,
    /// Accuracy radius in meters
    pub accuracy: f64,
    /// When the fix was produced
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    /// Create a fix stamped now.
    pub fn new(coordinate: Coordinate, speed: Option<f64>, accuracy: f64) -> Self {
        Self {
            coordinate,
            speed,
            accuracy,
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle state of the position source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionSourceState {
    /// No request made yet
    #[default]
    Idle,
    /// A one-shot fix request is in flight
    Acquiring,
    /// At least one fix has been delivered, no active watch
    Available,
    /// Continuous delivery in progress
    Watching,
    /// Watch explicitly released
    Stopped,
    /// Permission denied or platform failure
    Error,
}

impl std::fmt::Display for PositionSourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSourceState::Idle => write!(f, "Idle"),
            PositionSourceState::Acquiring => write!(f, "Acquiring"),
            PositionSourceState::Available => write!(f, "Available"),
            PositionSourceState::Watching => write!(f, "Watching"),
            PositionSourceState::Stopped => write!(f, "Stopped"),
            PositionSourceState::Error => write!(f, "Error"),
        }
    }
}

/// Why a fix could not be produced. The three variants map 1:1 to the
/// standard geolocation error codes so callers can show a precise
/// remediation message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The user declined location access
    #[error("location permission denied")]
    PermissionDenied,

    /// The platform could not determine a position
    #[error("position unavailable")]
    PositionUnavailable,

    /// No fix arrived within the configured timeout
    #[error("timed out waiting for a position fix")]
    Timeout,
}

impl PositionError {
    /// Actionable guidance for the end user. GPS acquisition is the only
    /// failure class surfaced directly, so the wording matters.
    pub fn user_guidance(&self) -> &'static str {
        match self {
            PositionError::PermissionDenied => {
                "Activa el permiso de ubicación para iniciar la navegación."
            }
            PositionError::PositionUnavailable => {
                "No pudimos obtener tu ubicación. Sal a un lugar abierto e inténtalo de nuevo."
            }
            PositionError::Timeout => {
                "La búsqueda de señal GPS tardó demasiado. Revisa tu conexión e inténtalo de nuevo."
            }
        }
    }
}

/// Position source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    /// Timeout for a one-shot fix request, in seconds
    pub acquire_timeout_secs: u64,
    /// Per-fix timeout while watching, in seconds
    pub watch_timeout_secs: u64,
    /// Maximum accepted fix staleness while watching, in seconds
    pub max_staleness_secs: u64,
    /// Interval between backend polls while watching, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_secs: 15,
            watch_timeout_secs: 10,
            max_staleness_secs: 3,
            poll_interval_ms: 1000,
        }
    }
}
