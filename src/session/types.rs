//! Navigation session types: status, achievements, trip record, errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No session in progress
    #[default]
    Stopped,
    /// Fixes are being accumulated
    Active,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Stopped => write!(f, "Stopped"),
            SessionStatus::Active => write!(f, "Active"),
        }
    }
}

/// Session controller failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// start() called while a session is already active
    #[error("a navigation session is already active")]
    AlreadyActive,

    /// An operation requiring an active session was called while stopped
    #[error("no active navigation session")]
    NotActive,
}

/// A distance milestone unlocked at most once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementThreshold {
    /// Cumulative distance at which the badge unlocks, in km
    pub distance_km: f64,
    /// Badge label
    pub label: String,
}

impl AchievementThreshold {
    pub fn new(distance_km: f64, label: impl Into<String>) -> Self {
        Self {
            distance_km,
            label: label.into(),
        }
    }
}

/// The product's defined milestones, in ascending threshold order.
pub fn default_thresholds() -> Vec<AchievementThreshold> {
    vec![
        AchievementThreshold::new(0.1, "Primeros pasos"),
        AchievementThreshold::new(0.5, "Senderista"),
        AchievementThreshold::new(1.0, "Explorador"),
        AchievementThreshold::new(3.0, "Aventurero"),
    ]
}

/// An achievement unlocked during the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementUnlock {
    /// Badge label
    pub label: String,
    /// Cumulative distance when it unlocked, in km
    pub at_distance_km: f64,
    /// When it unlocked
    pub unlocked_at: DateTime<Utc>,
}

/// Best-effort record of a completed trip, submitted to the backend once a
/// session ends. Field names follow the persistence endpoint's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// Trip identifier
    pub id: Uuid,
    /// Traveled path as (lng, lat) pairs, the order the backend stores
    pub points: Vec<[f64; 2]>,
    /// Session start time
    pub start_at: DateTime<Utc>,
    /// Session end time
    pub end_at: DateTime<Utc>,
    /// Estimated step count
    pub steps: u32,
    /// Cumulative traveled distance in meters
    pub distance_meters: f64,
}

/// Session controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Segments shorter than this are treated as GPS jitter, in km
    pub noise_floor_km: f64,
    /// Estimated stride length for the step count, in meters
    pub stride_m: f64,
    /// Milestone table, ascending by threshold
    pub thresholds: Vec<AchievementThreshold>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            noise_floor_km: 0.001,
            stride_m: 0.75,
            thresholds: default_thresholds(),
        }
    }
}
