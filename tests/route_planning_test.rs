//! Integration tests for route planning and the fallback guarantee.

use ecoruta::geo::Coordinate;
use ecoruta::routing::{
    DirectionsApi, PlannedRoute, ProviderRoute, ProviderStep, RouteError, RoutePlanner,
};

/// Provider that always fails at the network level.
struct DeadProvider;

impl DirectionsApi for DeadProvider {
    async fn fetch_route(
        &self,
        _start: Coordinate,
        _end: Coordinate,
    ) -> Result<ProviderRoute, RouteError> {
        Err(RouteError::Http("connection refused".to_string()))
    }
}

/// Provider that returns a fixed three-step route.
struct ScriptedProvider;

impl DirectionsApi for ScriptedProvider {
    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<ProviderRoute, RouteError> {
        Ok(ProviderRoute {
            geometry: vec![start, Coordinate::new(19.83, -97.37), end],
            distance_m: 6200.0,
            duration_s: 540.0,
            steps: vec![
                ProviderStep {
                    distance_m: 150.0,
                    maneuver_type: "depart".to_string(),
                    modifier: None,
                    instruction: "Dirígete al norte".to_string(),
                },
                ProviderStep {
                    distance_m: 5850.0,
                    maneuver_type: "turn".to_string(),
                    modifier: Some("right".to_string()),
                    instruction: "Gira a la derecha".to_string(),
                },
                ProviderStep {
                    distance_m: 200.0,
                    maneuver_type: "arrive".to_string(),
                    modifier: None,
                    instruction: "Has llegado".to_string(),
                },
            ],
        })
    }
}

fn scenario_endpoints() -> (Coordinate, Coordinate) {
    (
        Coordinate::new(19.80, -97.40),
        Coordinate::new(19.8546, -97.3556),
    )
}

/// End-to-end report for a 3-step route totalling 6.2 km / 9 minutes.
#[tokio::test]
async fn test_three_step_route_report() {
    let planner = RoutePlanner::new(ScriptedProvider);
    let (start, end) = scenario_endpoints();

    let route: PlannedRoute = planner
        .plan_route(start, end, "Cascada Velo de Novia")
        .await;

    assert_eq!(route.estimated_distance(), "6.2 km");
    assert_eq!(route.estimated_time(), "9 min");
    assert_eq!(route.instructions.len(), 3);
    assert!(route.instructions[0].text.starts_with("Inicia tu viaje"));
    assert!(route
        .instructions
        .last()
        .unwrap()
        .text
        .contains("Cascada Velo de Novia"));
}

/// Fallback guarantee: a dead provider still resolves with a two-point
/// straight-line route equal to the requested endpoints.
#[tokio::test]
async fn test_dead_provider_always_resolves() {
    let planner = RoutePlanner::new(DeadProvider);
    let (start, end) = scenario_endpoints();

    let route = planner.plan_route(start, end, "Mirador").await;

    assert!(route.is_fallback);
    assert_eq!(route.geometry.len(), 2);
    assert_eq!(route.geometry[0], start);
    assert_eq!(route.geometry[1], end);
    assert!(route.distance_km > 0.0);
    assert!(route
        .instructions
        .iter()
        .any(|i| i.text.contains("señales de tránsito")));
}
