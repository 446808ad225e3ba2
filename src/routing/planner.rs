//! Route planning: provider-backed routes with a straight-line safety net.
//!
//! `plan_route` never fails. When the directions provider is unreachable,
//! answers with an error status, or returns zero candidates, the planner
//! synthesizes a two-point straight-line route with heuristic estimates so
//! navigation always has something to follow.

use crate::geo::{self, Coordinate};
use crate::routing::provider::{DirectionsApi, ProviderRoute};
use crate::routing::types::{
    DirectionIcon, NextManeuver, PlannedRoute, RouteInstruction,
};

/// First instruction of every route.
pub const MSG_START: &str = "Inicia tu viaje";
/// Distance beyond which the fallback adds a long-trip notice, in km.
const LONG_TRIP_KM: f64 = 10.0;
/// Heuristic fallback duration: minutes per kilometer of straight line.
const FALLBACK_MIN_PER_KM: f64 = 2.0;

/// Plans routes against a directions provider.
pub struct RoutePlanner<P: DirectionsApi> {
    provider: P,
}

impl<P: DirectionsApi> RoutePlanner<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Compute a route from `start` to `end`. Infallible: provider failures
    /// degrade to the straight-line fallback.
    pub async fn plan_route(
        &self,
        start: Coordinate,
        end: Coordinate,
        destination_label: &str,
    ) -> PlannedRoute {
        match self.provider.fetch_route(start, end).await {
            Ok(route) if !route.geometry.is_empty() => {
                tracing::info!(
                    "Planned route to '{}': {:.1} km, {} steps",
                    destination_label,
                    route.distance_m / 1000.0,
                    route.steps.len()
                );
                derive_route(route, destination_label)
            }
            Ok(_) => {
                tracing::warn!("Provider returned a route with empty geometry, using fallback");
                straight_line_route(start, end, destination_label)
            }
            Err(err) => {
                tracing::warn!("Directions provider failed ({}), using fallback", err);
                straight_line_route(start, end, destination_label)
            }
        }
    }
}

/// Turn a provider route into a planned route with display-ready fields.
fn derive_route(route: ProviderRoute, destination_label: &str) -> PlannedRoute {
    let distance_km = geo::round_km(route.distance_m / 1000.0);
    let duration_min = (route.duration_s / 60.0).round() as u32;

    let mut instructions = Vec::with_capacity(route.steps.len().max(2));
    instructions.push(RouteInstruction::new(DirectionIcon::Depart, MSG_START));

    if route.steps.len() > 2 {
        for step in &route.steps[1..route.steps.len() - 1] {
            let icon = DirectionIcon::from_maneuver(&step.maneuver_type, step.modifier.as_deref());
            let text = format!("{} ({})", step.instruction, format_step_distance(step.distance_m));
            instructions.push(RouteInstruction::new(icon, text));
        }
    }

    instructions.push(RouteInstruction::new(
        DirectionIcon::Arrive,
        format!("Has llegado a {}", destination_label),
    ));

    // The first upcoming maneuver after departure feeds proximity prompts
    let next_maneuver = route.steps.get(1).map(|step| NextManeuver {
        distance_m: step.distance_m,
        text: step.instruction.clone(),
    });

    PlannedRoute {
        geometry: route.geometry,
        distance_km,
        duration_min,
        instructions,
        next_maneuver,
        destination_label: destination_label.to_string(),
        is_fallback: false,
    }
}

/// Synthesize the straight-line fallback route. Never fails.
pub fn straight_line_route(
    start: Coordinate,
    end: Coordinate,
    destination_label: &str,
) -> PlannedRoute {
    let distance_km = geo::round_km(geo::haversine_distance_km(start, end));
    let duration_min = (distance_km * FALLBACK_MIN_PER_KM).round() as u32;

    let mut instructions = vec![
        RouteInstruction::new(DirectionIcon::Depart, MSG_START),
        RouteInstruction::new(
            DirectionIcon::Straight,
            "Sigue la línea trazada hacia tu destino",
        ),
        RouteInstruction::new(
            DirectionIcon::Straight,
            "Mantén activado el centrado automático para no perder tu posición",
        ),
        RouteInstruction::new(
            DirectionIcon::Straight,
            "Mantente atento a las señales de tránsito",
        ),
    ];

    if distance_km > LONG_TRIP_KM {
        instructions.push(RouteInstruction::new(
            DirectionIcon::Straight,
            "Viaje largo: planea paradas de descanso",
        ));
    }

    instructions.push(RouteInstruction::new(
        DirectionIcon::Arrive,
        format!("Tu destino: {}", destination_label),
    ));

    PlannedRoute {
        geometry: vec![start, end],
        distance_km,
        duration_min,
        instructions,
        next_maneuver: None,
        destination_label: destination_label.to_string(),
        is_fallback: true,
    }
}

/// Distance annotation for an intermediate instruction.
fn format_step_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        geo::format_km(meters / 1000.0)
    } else {
        geo::format_m(meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::provider::ProviderStep;
    use crate::routing::types::RouteError;

    struct StubDirections {
        result: Result<ProviderRoute, RouteError>,
    }

    impl DirectionsApi for StubDirections {
        async fn fetch_route(
            &self,
            _start: Coordinate,
            _end: Coordinate,
        ) -> Result<ProviderRoute, RouteError> {
            self.result.clone()
        }
    }

    fn three_step_route() -> ProviderRoute {
        ProviderRoute {
            geometry: vec![
                Coordinate::new(19.80, -97.40),
                Coordinate::new(19.83, -97.37),
                Coordinate::new(19.8546, -97.3556),
            ],
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
                    distance_m: 5900.0,
                    maneuver_type: "turn".to_string(),
                    modifier: Some("left".to_string()),
                    instruction: "Gira a la izquierda".to_string(),
                },
                ProviderStep {
                    distance_m: 200.0,
                    maneuver_type: "arrive".to_string(),
                    modifier: None,
                    instruction: "Has llegado".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_plan_route_success() {
        let planner = RoutePlanner::new(StubDirections {
            result: Ok(three_step_route()),
        });

        let route = planner
            .plan_route(
                Coordinate::new(19.80, -97.40),
                Coordinate::new(19.8546, -97.3556),
                "Cascada Velo de Novia",
            )
            .await;

        assert!(!route.is_fallback);
        assert_eq!(route.estimated_distance(), "6.2 km");
        assert_eq!(route.estimated_time(), "9 min");
        assert_eq!(route.instructions.len(), 3);
        assert!(route.instructions[0].text.starts_with("Inicia tu viaje"));
        assert!(route.instructions[2].text.contains("Cascada Velo de Novia"));
        assert_eq!(route.instructions[1].icon, DirectionIcon::TurnLeft);
        assert!(route.instructions[1].text.contains("5.9 km"));

        let next = route.next_maneuver.unwrap();
        assert_eq!(next.text, "Gira a la izquierda");
        assert_eq!(next.distance_m, 5900.0);
    }

    #[tokio::test]
    async fn test_fallback_on_provider_error() {
        let planner = RoutePlanner::new(StubDirections {
            result: Err(RouteError::Status(500)),
        });

        let start = Coordinate::new(19.80, -97.40);
        let end = Coordinate::new(19.8546, -97.3556);
        let route = planner.plan_route(start, end, "El Salto").await;

        assert!(route.is_fallback);
        assert_eq!(route.geometry, vec![start, end]);
        assert_eq!(route.instructions[0].text, MSG_START);
        assert!(route
            .instructions
            .last()
            .unwrap()
            .text
            .contains("El Salto"));
        assert!(route.next_maneuver.is_none());
        // duration heuristic: 2 min per km of straight line
        assert_eq!(route.duration_min, (route.distance_km * 2.0).round() as u32);
    }

    #[tokio::test]
    async fn test_fallback_on_zero_candidates() {
        let planner = RoutePlanner::new(StubDirections {
            result: Err(RouteError::NoRoutes),
        });
        let route = planner
            .plan_route(
                Coordinate::new(19.80, -97.40),
                Coordinate::new(19.81, -97.39),
                "Mirador",
            )
            .await;
        assert!(route.is_fallback);
        assert_eq!(route.geometry.len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_long_trip_notice() {
        let start = Coordinate::new(19.80, -97.40);
        let far = Coordinate::new(20.10, -97.40); // ~33 km north
        let route = straight_line_route(start, far, "Lejos");
        assert!(route
            .instructions
            .iter()
            .any(|i| i.text.contains("Viaje largo")));

        let near = Coordinate::new(19.81, -97.40);
        let short = straight_line_route(start, near, "Cerca");
        assert!(!short
            .instructions
            .iter()
            .any(|i| i.text.contains("Viaje largo")));
    }

    #[tokio::test]
    async fn test_two_step_route_collapses_to_depart_and_arrive() {
        let mut route = three_step_route();
        route.steps.truncate(2);
        let planner = RoutePlanner::new(StubDirections { result: Ok(route) });

        let planned = planner
            .plan_route(
                Coordinate::new(19.80, -97.40),
                Coordinate::new(19.81, -97.39),
                "Cueva",
            )
            .await;
        assert_eq!(planned.instructions.len(), 2);
        assert_eq!(planned.instructions[0].icon, DirectionIcon::Depart);
        assert_eq!(planned.instructions[1].icon, DirectionIcon::Arrive);
    }
}
