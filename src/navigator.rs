//! The composition point tying the core together.
//!
//! The navigator wires the position watch into the session controller and
//! the map surface, owns the start/stop/retarget operations, and enforces
//! the cancellation semantics: no fix is processed after stop, and a stale
//! in-flight replan can never overwrite a newer one (or resurrect a stopped
//! session).

use crate::catalog::{Destination, PlaceRecord};
use crate::config::NavConfig;
use crate::map::MapSurface;
use crate::position::{LocationBackend, PositionError, PositionFix, PositionSource};
use crate::routing::{DirectionsApi, PlannedRoute, RoutePlanner, RouteState};
use crate::session::{
    AchievementUnlock, NavigationController, SessionError, SessionStatus, TripLogClient,
    TripRecord,
};
use crate::geo::Coordinate;
use crossbeam::channel::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

/// Why navigation could not start. GPS acquisition is the only failure
/// class surfaced to the user; the session variant flags caller misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    /// No usable fix; see `PositionError::user_guidance`
    #[error(transparent)]
    Position(#[from] PositionError),

    /// A session was already active
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Navigation was stopped while the start sequence was still in flight
    #[error("navigation stopped before start completed")]
    Cancelled,
}

/// Events from the navigation core, in delivery order.
#[derive(Debug, Clone)]
pub enum NavEvent {
    /// A session started with this destination and initial route
    SessionStarted {
        destination: Destination,
        route: PlannedRoute,
    },
    /// A position fix was processed
    Fix(PositionFix),
    /// The proximity instruction changed
    InstructionChanged(String),
    /// A distance milestone unlocked
    AchievementUnlocked(AchievementUnlock),
    /// A retarget gesture fired; replanning is in flight
    Recalculating,
    /// The replanned route was installed
    Recalculated(PlannedRoute),
    /// The session stopped; record already submitted best-effort
    SessionStopped(TripRecord),
}

/// Orchestrates position source, route planner, session controller, and
/// map surface for one live navigation session at a time.
pub struct Navigator<B: LocationBackend, P: DirectionsApi> {
    position: PositionSource<B>,
    planner: Arc<RoutePlanner<P>>,
    controller: Arc<Mutex<NavigationController>>,
    surface: Arc<Mutex<MapSurface>>,
    route: Arc<Mutex<RouteState>>,
    trip_log: Option<TripLogClient>,
    event_tx: Option<Sender<NavEvent>>,
    /// Bumped on every stop; a fix pump only processes while its captured
    /// generation is current, so a stale pump can never feed a new session.
    session_gen: Arc<AtomicU64>,
}

impl<B: LocationBackend, P: DirectionsApi> Navigator<B, P> {
    /// Build a navigator from configuration, a location backend, and a
    /// directions provider.
    pub fn new(config: NavConfig, backend: B, provider: P) -> Self {
        let trip_log = config
            .trip_log_base_url
            .as_ref()
            .map(|url| TripLogClient::new(url.clone()));

        Self {
            position: PositionSource::new(config.position, backend),
            planner: Arc::new(RoutePlanner::new(provider)),
            controller: Arc::new(Mutex::new(NavigationController::new(config.session))),
            surface: Arc::new(Mutex::new(MapSurface::new(config.map))),
            route: Arc::new(Mutex::new(RouteState::new())),
            trip_log,
            event_tx: None,
            session_gen: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get an event receiver for navigation events.
    pub fn event_receiver(&mut self) -> Receiver<NavEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.event_tx = Some(tx);
        rx
    }

    fn send_event(&self, event: NavEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Whether a session is active.
    pub fn is_active(&self) -> bool {
        self.lock_controller().status() == SessionStatus::Active
    }

    /// The currently installed planned route, if any.
    pub fn current_route(&self) -> Option<PlannedRoute> {
        self.lock_route().current().cloned()
    }

    /// The latest proximity instruction, if any tier matched.
    pub fn current_instruction(&self) -> Option<String> {
        self.lock_controller().current_instruction().map(String::from)
    }

    /// Cumulative traveled distance this session, in km.
    pub fn cumulative_distance_km(&self) -> f64 {
        self.lock_controller().cumulative_distance_km()
    }

    /// Achievement labels unlocked so far this session.
    pub fn unlocked_achievements(&self) -> Vec<String> {
        self.lock_controller().unlocked_achievements().to_vec()
    }

    /// The destination proximity math currently targets.
    pub fn active_destination(&self) -> Option<Destination> {
        self.lock_surface().active_destination().cloned()
    }

    /// Toggle map auto-centering; returns the new state.
    pub fn toggle_auto_centering(&self) -> bool {
        self.lock_surface().toggle_auto_centering()
    }

    /// Current map viewport center.
    pub fn viewport_center(&self) -> Option<Coordinate> {
        self.lock_surface().viewport_center()
    }

    /// Start navigating to a catalog place.
    ///
    /// Acquires a fresh fix, resolves the destination (with the documented
    /// coordinate fallback), plans the initial route (with the straight-line
    /// fallback), then starts the session and the continuous watch.
    pub async fn start_navigation(
        &self,
        place: &PlaceRecord,
    ) -> Result<PlannedRoute, StartError> {
        let generation = self.session_gen.load(Ordering::SeqCst);
        let destination = place.destination();

        let fix = self.position.get_current_position().await?;
        self.lock_controller().start()?;

        {
            let mut surface = self.lock_surface();
            surface.set_canonical_destination(destination.clone());
            surface.on_fix(&fix);
        }

        let seq = self.lock_route().begin_plan();
        let plan = self
            .planner
            .plan_route(fix.coordinate, destination.coordinate, &destination.label)
            .await;

        // A stop raced the plan. The stop already reset the controller, the
        // route state, and the surface; abort instead of resurrecting them.
        if self.session_gen.load(Ordering::SeqCst) != generation {
            tracing::info!("Start cancelled by a concurrent stop");
            return Err(StartError::Cancelled);
        }

        self.lock_route().install(seq, plan.clone());

        self.send_event(NavEvent::SessionStarted {
            destination,
            route: plan.clone(),
        });

        self.spawn_fix_pump();
        Ok(plan)
    }

    /// Stop navigation: cancel the watch, reset all session state, discard
    /// any in-flight replan, and fire the best-effort trip log.
    pub fn stop_navigation(&self) -> Result<TripRecord, SessionError> {
        // Watch first: no fix may be delivered or processed after stop
        self.position.stop_watching();

        let record = self.lock_controller().stop()?;
        // Only bumped on a successful stop, so a failed stop cannot cancel a
        // start sequence whose session it never touched
        self.session_gen.fetch_add(1, Ordering::SeqCst);
        self.lock_route().reset();
        self.lock_surface().clear_session_state();

        if let Some(trip_log) = &self.trip_log {
            trip_log.submit(record.clone());
        }

        self.send_event(NavEvent::SessionStopped(record.clone()));
        Ok(record)
    }

    /// Handle a map click at an event timestamp (milliseconds).
    ///
    /// Three clicks inside the rolling window while a session is active
    /// retarget the trip to the clicked coordinate and replan from the
    /// current position. Never raises: replanning failures fall back to the
    /// straight-line route, stale results are discarded.
    pub async fn register_map_click(
        &self,
        coordinate: Coordinate,
        at_ms: u64,
    ) -> Option<PlannedRoute> {
        let session_active = self.is_active();
        let destination =
            self.lock_surface()
                .register_click(coordinate, at_ms, session_active)?;

        self.send_event(NavEvent::Recalculating);
        tracing::info!("Recalculando ruta hacia {}", destination.coordinate);

        let start = self
            .position
            .latest_fix()
            .map(|fix| fix.coordinate)
            .unwrap_or(coordinate);

        let seq = self.lock_route().begin_plan();
        let plan = self
            .planner
            .plan_route(start, destination.coordinate, &destination.label)
            .await;

        // Last-writer-wins: a newer retarget or a stop invalidated `seq`
        if !self.is_active() || !self.lock_route().install(seq, plan.clone()) {
            tracing::debug!("Discarding stale replan result");
            return None;
        }

        self.send_event(NavEvent::Recalculated(plan.clone()));
        Some(plan)
    }

    /// Start the watch and pump fixes into the controller and the surface.
    fn spawn_fix_pump(&self) {
        let mut rx = self.position.watch();
        let controller = self.controller.clone();
        let surface = self.surface.clone();
        let route = self.route.clone();
        let event_tx = self.event_tx.clone();
        let session_gen = self.session_gen.clone();
        let generation = session_gen.load(Ordering::SeqCst);

        tokio::spawn(async move {
            let send = |event: NavEvent| {
                if let Some(tx) = &event_tx {
                    let _ = tx.send(event);
                }
            };
            let mut last_instruction: Option<String> = None;

            loop {
                let fix = match rx.recv().await {
                    Ok(fix) => fix,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Fix pump lagged, {} fixes skipped", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                if session_gen.load(Ordering::SeqCst) != generation {
                    break;
                }

                // Destination and maneuver snapshots are taken per fix so a
                // retarget mid-session is reflected on the very next update
                let destination = {
                    let mut surface = surface.lock().unwrap_or_else(|e| e.into_inner());
                    surface.on_fix(&fix);
                    surface.active_destination().cloned()
                };
                let next_maneuver =
                    route.lock().unwrap_or_else(|e| e.into_inner()).next_maneuver();

                let mut controller = controller.lock().unwrap_or_else(|e| e.into_inner());
                if controller
                    .handle_position_update(&fix, destination.as_ref(), next_maneuver.as_ref())
                    .is_err()
                {
                    // Session stopped between delivery and processing
                    break;
                }

                send(NavEvent::Fix(fix));

                let instruction = controller.current_instruction().map(String::from);
                if instruction != last_instruction {
                    if let Some(text) = &instruction {
                        send(NavEvent::InstructionChanged(text.clone()));
                    }
                    last_instruction = instruction;
                }

                for unlock in controller.pop_unlocks() {
                    send(NavEvent::AchievementUnlocked(unlock));
                }
            }

            tracing::debug!("Fix pump exited");
        });
    }

    fn lock_controller(&self) -> std::sync::MutexGuard<'_, NavigationController> {
        self.controller.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_surface(&self) -> std::sync::MutexGuard<'_, MapSurface> {
        self.surface.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_route(&self) -> std::sync::MutexGuard<'_, RouteState> {
        self.route.lock().unwrap_or_else(|e| e.into_inner())
    }
}
