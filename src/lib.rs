//! ecoruta - Live-navigation core for an ecotourism companion app.
//!
//! Provides GPS position acquisition and watching, route planning against an
//! external directions provider with a straight-line fallback, turn-by-turn
//! instruction derivation, distance/achievement accrual from the fix stream,
//! and map-state orchestration (auto-centering, triple-click retargeting).

pub mod catalog;
pub mod config;
pub mod geo;
pub mod map;
pub mod navigator;
pub mod position;
pub mod routing;
pub mod session;

// Re-export commonly used types
pub use catalog::{Destination, PlaceRecord};
pub use config::NavConfig;
pub use geo::{haversine_distance_km, normalize_coordinate, Coordinate};
pub use map::MapSurface;
pub use navigator::{NavEvent, Navigator, StartError};
pub use position::{MockLocationBackend, PositionSource};
pub use routing::{MapboxDirections, PlannedRoute, RoutePlanner};
pub use session::NavigationController;
