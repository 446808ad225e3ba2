//! Map interaction surface: auto-centering and the retarget gesture.

pub mod surface;

pub use surface::{MapConfig, MapSurface, TripleClickDetector, CUSTOM_DESTINATION_LABEL};
