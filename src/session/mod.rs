//! Navigation session: live trip state, achievements, trip logging.

pub mod controller;
pub mod trip_log;
pub mod types;

pub use controller::NavigationController;
pub use trip_log::TripLogClient;
pub use types::{
    default_thresholds, AchievementThreshold, AchievementUnlock, SessionConfig, SessionError,
    SessionStatus, TripRecord,
};
