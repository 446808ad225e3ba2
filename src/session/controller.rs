//! Navigation session controller: the live trip state machine.
//!
//! Accumulates the traveled path from the fix stream, accrues distance above
//! a jitter noise floor, derives the proximity-based current instruction,
//! and unlocks distance milestones exactly once per session.

use crate::catalog::Destination;
use crate::geo::{self, haversine_distance_km, Coordinate};
use crate::position::PositionFix;
use crate::routing::NextManeuver;
use crate::session::types::{
    AchievementUnlock, SessionConfig, SessionError, SessionStatus, TripRecord,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Remaining distance below which the user has arrived, in km (50 m).
const ARRIVED_KM: f64 = 0.05;
/// Remaining distance below which the "almost there" tier applies (200 m).
const ALMOST_THERE_KM: f64 = 0.2;
/// Remaining distance below which km-precision countdown applies (1 km).
const COUNTDOWN_KM: f64 = 1.0;
/// Remaining distance below which the next-maneuver hint is surfaced (5 km).
const MANEUVER_HINT_KM: f64 = 5.0;

/// Owns the live trip state. One per navigator; reset on every stop.
pub struct NavigationController {
    config: SessionConfig,
    status: SessionStatus,
    session_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    /// Append-only; order equals fix delivery order
    traveled_path: Vec<Coordinate>,
    cumulative_km: f64,
    unlocked: Vec<String>,
    unlock_queue: Vec<AchievementUnlock>,
    current_instruction: Option<String>,
}

impl NavigationController {
    /// Create a controller with the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Stopped,
            session_id: None,
            started_at: None,
            traveled_path: Vec::new(),
            cumulative_km: 0.0,
            unlocked: Vec::new(),
            unlock_queue: Vec::new(),
            current_instruction: None,
        }
    }

    /// Create a controller with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SessionConfig::default())
    }

    /// Start a navigation session from a clean state.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.status == SessionStatus::Active {
            return Err(SessionError::AlreadyActive);
        }

        self.reset_state();
        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.started_at = Some(Utc::now());
        self.status = SessionStatus::Active;

        tracing::info!("Navigation session {} started", session_id);
        Ok(())
    }

    /// Stop the session, returning the trip record for best-effort logging.
    /// Leaves the controller fully reset.
    pub fn stop(&mut self) -> Result<TripRecord, SessionError> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }

        let record = TripRecord {
            id: self.session_id.unwrap_or_else(Uuid::new_v4),
            points: self.traveled_path.iter().map(|c| c.to_lng_lat()).collect(),
            start_at: self.started_at.unwrap_or_else(Utc::now),
            end_at: Utc::now(),
            steps: self.estimated_steps(),
            distance_meters: self.cumulative_km * 1000.0,
        };

        tracing::info!(
            "Navigation session stopped: {:.2} km over {} fixes",
            self.cumulative_km,
            self.traveled_path.len()
        );

        self.reset_state();
        self.status = SessionStatus::Stopped;
        Ok(record)
    }

    /// Process one position fix.
    ///
    /// `destination` is whatever the map surface currently targets (custom
    /// destination takes priority upstream); `next_maneuver` comes from the
    /// installed plan. Only callable while active.
    pub fn handle_position_update(
        &mut self,
        fix: &PositionFix,
        destination: Option<&Destination>,
        next_maneuver: Option<&NextManeuver>,
    ) -> Result<(), SessionError> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }

        // 1. Append to the traveled path
        let coordinate = fix.coordinate;
        let previous = self.traveled_path.last().copied();
        self.traveled_path.push(coordinate);

        // 2. Accrue distance above the noise floor
        if let Some(prev) = previous {
            let segment_km = haversine_distance_km(prev, coordinate);
            if segment_km > self.config.noise_floor_km {
                self.cumulative_km += segment_km;
            } else {
                tracing::trace!("Segment {:.5} km below noise floor, ignored", segment_km);
            }
        }

        // 3. Recompute the current instruction from remaining distance
        if let Some(dest) = destination {
            let remaining_km = haversine_distance_km(coordinate, dest.coordinate);
            self.current_instruction = proximity_instruction(remaining_km, next_maneuver);
        }

        // 4. Evaluate milestones against the updated cumulative distance
        self.evaluate_achievements();

        Ok(())
    }

    /// Proximity instruction derived from the latest fix, if any tier matched.
    pub fn current_instruction(&self) -> Option<&str> {
        self.current_instruction.as_deref()
    }

    /// Current session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Cumulative traveled distance in km.
    pub fn cumulative_distance_km(&self) -> f64 {
        self.cumulative_km
    }

    /// The traveled path, in delivery order.
    pub fn traveled_path(&self) -> &[Coordinate] {
        &self.traveled_path
    }

    /// Labels unlocked so far this session, in unlock order.
    pub fn unlocked_achievements(&self) -> &[String] {
        &self.unlocked
    }

    /// Drain pending unlock notifications.
    pub fn pop_unlocks(&mut self) -> Vec<AchievementUnlock> {
        std::mem::take(&mut self.unlock_queue)
    }

    /// Step estimate from cumulative distance and stride length.
    pub fn estimated_steps(&self) -> u32 {
        if self.config.stride_m <= 0.0 {
            return 0;
        }
        (self.cumulative_km * 1000.0 / self.config.stride_m).round() as u32
    }

    fn evaluate_achievements(&mut self) {
        for threshold in &self.config.thresholds {
            if self.cumulative_km >= threshold.distance_km
                && !self.unlocked.iter().any(|l| l == &threshold.label)
            {
                tracing::info!(
                    "Achievement unlocked: '{}' at {:.2} km",
                    threshold.label,
                    self.cumulative_km
                );
                self.unlocked.push(threshold.label.clone());
                self.unlock_queue.push(AchievementUnlock {
                    label: threshold.label.clone(),
                    at_distance_km: self.cumulative_km,
                    unlocked_at: Utc::now(),
                });
            }
        }
    }

    fn reset_state(&mut self) {
        self.session_id = None;
        self.started_at = None;
        self.traveled_path.clear();
        self.cumulative_km = 0.0;
        self.unlocked.clear();
        self.unlock_queue.clear();
        self.current_instruction = None;
    }
}

/// The proximity cascade. Nearest matching tier wins; the rest are skipped.
fn proximity_instruction(
    remaining_km: f64,
    next_maneuver: Option<&NextManeuver>,
) -> Option<String> {
    if remaining_km <= ARRIVED_KM {
        Some("Has llegado a tu destino".to_string())
    } else if remaining_km <= ALMOST_THERE_KM {
        Some(format!(
            "¡Ya casi llegas! Faltan {}",
            geo::format_m(remaining_km * 1000.0)
        ))
    } else if remaining_km <= COUNTDOWN_KM {
        Some(format!(
            "Faltan {} para llegar",
            geo::format_km(remaining_km)
        ))
    } else if remaining_km < MANEUVER_HINT_KM {
        next_maneuver.map(|m| format!("En {}, {}", geo::format_m(m.distance_m), m.text))
    } else {
        None
    }
}
