//! Map interaction surface: viewport centering and the retarget gesture.
//!
//! This is deliberately free of any rendering concern; it reconciles the fix
//! stream with viewport state and owns the custom destination. Triple-click
//! detection is an explicit state machine over event timestamps compared
//! against a deadline, not a scheduled reset callback racing further clicks.

use crate::catalog::Destination;
use crate::geo::Coordinate;
use crate::position::PositionFix;
use serde::{Deserialize, Serialize};

/// Label shown for ad hoc destinations set by the retarget gesture.
pub const CUSTOM_DESTINATION_LABEL: &str = "Destino personalizado";

/// Map surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Rolling window for the triple-click gesture, in milliseconds
    pub triple_click_window_ms: u64,
    /// Whether auto-centering starts enabled
    pub auto_center_default: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            triple_click_window_ms: 500,
            auto_center_default: true,
        }
    }
}

/// Counts clicks against a rolling deadline. Three clicks before the
/// deadline passes trigger the gesture and reset the counter.
#[derive(Debug, Clone)]
pub struct TripleClickDetector {
    window_ms: u64,
    count: u8,
    deadline_ms: Option<u64>,
}

impl TripleClickDetector {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            count: 0,
            deadline_ms: None,
        }
    }

    /// Register a click at the given event timestamp (milliseconds).
    /// Returns true when this click completes a triple.
    pub fn register(&mut self, at_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if at_ms <= deadline => self.count += 1,
            _ => {
                // Window expired or first click: restart the count
                self.count = 1;
                self.deadline_ms = Some(at_ms + self.window_ms);
            }
        }

        if self.count >= 3 {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Forget any in-progress count.
    pub fn reset(&mut self) {
        self.count = 0;
        self.deadline_ms = None;
    }
}

/// Reconciles the position stream with viewport centering and owns the
/// destination the rest of the core navigates toward.
pub struct MapSurface {
    config: MapConfig,
    auto_center: bool,
    viewport_center: Option<Coordinate>,
    canonical: Option<Destination>,
    custom: Option<Destination>,
    clicks: TripleClickDetector,
}

impl MapSurface {
    pub fn new(config: MapConfig) -> Self {
        let auto_center = config.auto_center_default;
        let clicks = TripleClickDetector::new(config.triple_click_window_ms);
        Self {
            config,
            auto_center,
            viewport_center: None,
            canonical: None,
            custom: None,
            clicks,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MapConfig::default())
    }

    /// Whether the viewport recenters on every fix.
    pub fn is_auto_centering(&self) -> bool {
        self.auto_center
    }

    /// Toggle auto-centering. This is the only escape from forced
    /// re-centering: while enabled, a manual pan snaps back on the next fix.
    pub fn toggle_auto_centering(&mut self) -> bool {
        self.auto_center = !self.auto_center;
        tracing::debug!("Auto-centering {}", if self.auto_center { "on" } else { "off" });
        self.auto_center
    }

    /// Set auto-centering explicitly.
    pub fn set_auto_centering(&mut self, enabled: bool) {
        self.auto_center = enabled;
    }

    /// Current viewport center, if any fix or pan has set one.
    pub fn viewport_center(&self) -> Option<Coordinate> {
        self.viewport_center
    }

    /// Apply a new fix: recenter when auto-centering, otherwise leave the
    /// viewport under manual control.
    pub fn on_fix(&mut self, fix: &PositionFix) {
        if self.auto_center {
            self.viewport_center = Some(fix.coordinate);
        }
    }

    /// Record a manual pan. The next fix snaps back if auto-centering is on.
    pub fn pan_to(&mut self, center: Coordinate) {
        self.viewport_center = Some(center);
    }

    /// Set the canonical (catalog) destination for the session.
    pub fn set_canonical_destination(&mut self, destination: Destination) {
        self.canonical = Some(destination);
    }

    /// The destination proximity and arrival math must use: the custom
    /// destination when one is set, the canonical one otherwise.
    pub fn active_destination(&self) -> Option<&Destination> {
        self.custom.as_ref().or(self.canonical.as_ref())
    }

    /// The active custom destination, if any.
    pub fn custom_destination(&self) -> Option<&Destination> {
        self.custom.as_ref()
    }

    /// Register a map click at an event timestamp.
    ///
    /// When this click completes a triple within the rolling window and a
    /// session is active, the clicked coordinate becomes the new custom
    /// destination (replacing any prior) and is returned for replanning.
    pub fn register_click(
        &mut self,
        coordinate: Coordinate,
        at_ms: u64,
        session_active: bool,
    ) -> Option<Destination> {
        if !self.clicks.register(at_ms) {
            return None;
        }

        if !session_active {
            tracing::debug!("Retarget gesture ignored: no active session");
            return None;
        }

        let destination = Destination::new(coordinate, CUSTOM_DESTINATION_LABEL);
        tracing::info!("Retarget gesture: new custom destination {}", coordinate);
        self.custom = Some(destination.clone());
        Some(destination)
    }

    /// Drop the custom destination and any in-progress click count.
    /// Called when navigation stops.
    pub fn clear_session_state(&mut self) {
        self.custom = None;
        self.canonical = None;
        self.clicks.reset();
    }

    /// The configured gesture window, for callers that surface hints.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(lat: f64, lng: f64) -> PositionFix {
        PositionFix::new(Coordinate::new(lat, lng), None, 5.0)
    }

    #[test]
    fn test_triple_click_within_window() {
        let mut detector = TripleClickDetector::new(500);
        assert!(!detector.register(0));
        assert!(!detector.register(200));
        assert!(detector.register(400));
        // Counter reset after trigger
        assert!(!detector.register(450));
    }

    #[test]
    fn test_clicks_outside_window_restart_count() {
        let mut detector = TripleClickDetector::new(500);
        assert!(!detector.register(0));
        assert!(!detector.register(200));
        // Past the 0+500 deadline: restarts at 1
        assert!(!detector.register(600));
        assert!(!detector.register(700));
        assert!(detector.register(800));
    }

    #[test]
    fn test_auto_centering_snaps_back() {
        let mut surface = MapSurface::with_defaults();
        surface.on_fix(&fix_at(19.80, -97.40));
        assert_eq!(surface.viewport_center(), Some(Coordinate::new(19.80, -97.40)));

        // User pans away; next fix snaps back while auto-centering is on
        surface.pan_to(Coordinate::new(20.0, -98.0));
        surface.on_fix(&fix_at(19.81, -97.39));
        assert_eq!(surface.viewport_center(), Some(Coordinate::new(19.81, -97.39)));

        // With auto-centering off, the pan sticks
        surface.toggle_auto_centering();
        surface.pan_to(Coordinate::new(20.0, -98.0));
        surface.on_fix(&fix_at(19.82, -97.38));
        assert_eq!(surface.viewport_center(), Some(Coordinate::new(20.0, -98.0)));
    }

    #[test]
    fn test_custom_destination_takes_priority() {
        let mut surface = MapSurface::with_defaults();
        surface.set_canonical_destination(Destination::new(
            Coordinate::new(19.8546, -97.3556),
            "Cascada Velo de Novia",
        ));
        assert_eq!(
            surface.active_destination().unwrap().label,
            "Cascada Velo de Novia"
        );

        let click = Coordinate::new(19.83, -97.37);
        assert!(surface.register_click(click, 0, true).is_none());
        assert!(surface.register_click(click, 100, true).is_none());
        let retarget = surface.register_click(click, 200, true).unwrap();

        assert_eq!(retarget.coordinate, click);
        assert_eq!(
            surface.active_destination().unwrap().label,
            CUSTOM_DESTINATION_LABEL
        );

        // A later gesture replaces the previous custom destination
        let click2 = Coordinate::new(19.84, -97.36);
        surface.register_click(click2, 1000, true);
        surface.register_click(click2, 1100, true);
        surface.register_click(click2, 1200, true);
        assert_eq!(surface.active_destination().unwrap().coordinate, click2);

        surface.clear_session_state();
        assert!(surface.active_destination().is_none());
    }

    #[test]
    fn test_gesture_inactive_session_is_noop() {
        let mut surface = MapSurface::with_defaults();
        let click = Coordinate::new(19.83, -97.37);
        assert!(surface.register_click(click, 0, false).is_none());
        assert!(surface.register_click(click, 100, false).is_none());
        assert!(surface.register_click(click, 200, false).is_none());
        assert!(surface.custom_destination().is_none());
    }
}
