//! Position acquisition and continuous watch over a platform backend.

pub mod mock;
pub mod source;
pub mod types;

pub use mock::MockLocationBackend;
pub use source::{LocationBackend, PositionSource};
pub use types::{PositionConfig, PositionError, PositionFix, PositionSourceState};
