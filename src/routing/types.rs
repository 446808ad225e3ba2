//! Route planner types: planned routes, instructions, errors, configuration.

use crate::geo::{self, Coordinate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction category shown as a prefix icon on each instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionIcon {
    /// Start of the trip
    Depart,
    /// Turn left
    TurnLeft,
    /// Turn right
    TurnRight,
    /// Keep straight
    Straight,
    /// Arrival at the destination
    Arrive,
}

impl DirectionIcon {
    /// Classify a provider maneuver into an icon category.
    pub fn from_maneuver(maneuver_type: &str, modifier: Option<&str>) -> Self {
        match maneuver_type {
            "depart" => DirectionIcon::Depart,
            "arrive" => DirectionIcon::Arrive,
            _ => match modifier {
                Some(m) if m.contains("left") => DirectionIcon::TurnLeft,
                Some(m) if m.contains("right") => DirectionIcon::TurnRight,
                _ => DirectionIcon::Straight,
            },
        }
    }

    /// The glyph shown before the instruction text.
    pub fn symbol(&self) -> &'static str {
        match self {
            DirectionIcon::Depart => "🚩",
            DirectionIcon::TurnLeft => "↰",
            DirectionIcon::TurnRight => "↱",
            DirectionIcon::Straight => "↑",
            DirectionIcon::Arrive => "🏁",
        }
    }
}

/// A single human-readable navigation instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInstruction {
    /// Direction category
    pub icon: DirectionIcon,
    /// Display text, markup already stripped
    pub text: String,
}

impl RouteInstruction {
    pub fn new(icon: DirectionIcon, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for RouteInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon.symbol(), self.text)
    }
}

/// The immediate next maneuver, kept aside for near-field proximity prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextManeuver {
    /// Distance to the maneuver in meters
    pub distance_m: f64,
    /// Maneuver text, markup already stripped
    pub text: String,
}

/// A complete planned route. Recomputed wholesale on every (re)plan,
/// never patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoute {
    /// Route geometry in canonical (lat, lng) order
    pub geometry: Vec<Coordinate>,
    /// Total distance in kilometers, one-decimal precision
    pub distance_km: f64,
    /// Total duration in whole minutes
    pub duration_min: u32,
    /// Ordered instruction sequence
    pub instructions: Vec<RouteInstruction>,
    /// Next maneuver hint, if the provider supplied steps
    pub next_maneuver: Option<NextManeuver>,
    /// Display name of the destination this route leads to
    pub destination_label: String,
    /// True when this is the synthesized straight-line fallback
    pub is_fallback: bool,
}

impl PlannedRoute {
    /// Display string for the total distance, e.g. "6.2 km".
    pub fn estimated_distance(&self) -> String {
        geo::format_km(self.distance_km)
    }

    /// Display string for the total duration, e.g. "9 min".
    pub fn estimated_time(&self) -> String {
        geo::format_minutes(self.duration_min)
    }
}

/// Why a directions request failed. Every variant funnels into the
/// straight-line fallback; none of them reach the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Network-level failure reaching the provider
    #[error("directions provider unreachable: {0}")]
    Http(String),

    /// Provider answered with a non-success status
    #[error("directions provider returned status {0}")]
    Status(u16),

    /// Provider answered 200 with zero route candidates
    #[error("directions provider returned no routes")]
    NoRoutes,

    /// Provider payload could not be decoded
    #[error("invalid directions response: {0}")]
    InvalidResponse(String),
}

/// The current plan plus a sequence number implementing last-writer-wins
/// installation. Replans are raced: a retarget can fire while a previous
/// plan is still in flight, and only the latest request may land.
#[derive(Debug, Default)]
pub struct RouteState {
    current: Option<PlannedRoute>,
    seq: u64,
}

impl RouteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a plan slot. The returned sequence must be presented to
    /// `install`; any older sequence is stale from this point on.
    pub fn begin_plan(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Install a resolved plan if its sequence is still current.
    /// Returns false (and discards the plan) when a newer plan or a stop
    /// superseded it.
    pub fn install(&mut self, seq: u64, route: PlannedRoute) -> bool {
        if seq != self.seq {
            tracing::debug!(
                "Discarding stale plan (seq {} != current {})",
                seq,
                self.seq
            );
            return false;
        }
        self.current = Some(route);
        true
    }

    /// Clear the plan and invalidate any in-flight result.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.current = None;
    }

    /// The current planned route, if one is installed.
    pub fn current(&self) -> Option<&PlannedRoute> {
        self.current.as_ref()
    }

    /// The current plan's next-maneuver hint.
    pub fn next_maneuver(&self) -> Option<NextManeuver> {
        self.current.as_ref().and_then(|r| r.next_maneuver.clone())
    }
}

/// Route planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Directions provider base URL
    pub base_url: String,
    /// Routing profile
    pub profile: String,
    /// Provider access credential
    pub access_token: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com/directions/v5/mapbox".to_string(),
            profile: "driving".to_string(),
            access_token: String::new(),
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_classification() {
        assert_eq!(
            DirectionIcon::from_maneuver("depart", None),
            DirectionIcon::Depart
        );
        assert_eq!(
            DirectionIcon::from_maneuver("arrive", Some("straight")),
            DirectionIcon::Arrive
        );
        assert_eq!(
            DirectionIcon::from_maneuver("turn", Some("left")),
            DirectionIcon::TurnLeft
        );
        assert_eq!(
            DirectionIcon::from_maneuver("turn", Some("sharp right")),
            DirectionIcon::TurnRight
        );
        assert_eq!(
            DirectionIcon::from_maneuver("continue", None),
            DirectionIcon::Straight
        );
    }

    #[test]
    fn test_route_state_last_writer_wins() {
        let mut state = RouteState::new();
        let older = state.begin_plan();
        let newer = state.begin_plan();

        let route = PlannedRoute {
            geometry: vec![],
            distance_km: 1.0,
            duration_min: 2,
            instructions: vec![],
            next_maneuver: None,
            destination_label: "X".to_string(),
            is_fallback: true,
        };

        assert!(!state.install(older, route.clone()));
        assert!(state.current().is_none());
        assert!(state.install(newer, route));
        assert!(state.current().is_some());
    }

    #[test]
    fn test_route_state_reset_invalidates_in_flight() {
        let mut state = RouteState::new();
        let seq = state.begin_plan();
        state.reset();

        let route = PlannedRoute {
            geometry: vec![],
            distance_km: 1.0,
            duration_min: 2,
            instructions: vec![],
            next_maneuver: None,
            destination_label: "X".to_string(),
            is_fallback: true,
        };

        assert!(!state.install(seq, route));
        assert!(state.current().is_none());
    }
}
