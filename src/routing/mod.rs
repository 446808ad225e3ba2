//! Route planning against an external directions provider, with a
//! straight-line fallback and last-writer-wins plan state.

pub mod planner;
pub mod provider;
pub mod types;

pub use planner::{straight_line_route, RoutePlanner, MSG_START};
pub use provider::{DirectionsApi, MapboxDirections, ProviderRoute, ProviderStep};
pub use types::{
    DirectionIcon, NextManeuver, PlannedRoute, RouteError, RouteInstruction, RouteState,
    RoutingConfig,
};
