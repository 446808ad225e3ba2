//! ecoruta demo: a simulated navigation session.
//!
//! Replays a scripted GPS trace toward a catalog place with the directions
//! provider offline, exercising the straight-line fallback, the proximity
//! cascade, and the achievement milestones. Run with RUST_LOG=debug for the
//! full trace.

use anyhow::Result;
use ecoruta::geo::Coordinate;
use ecoruta::navigator::{NavEvent, Navigator};
use ecoruta::position::MockLocationBackend;
use ecoruta::routing::{DirectionsApi, ProviderRoute, RouteError};
use ecoruta::{NavConfig, PlaceRecord};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// A provider with no connectivity; every plan takes the fallback path.
struct OfflineDirections;

impl DirectionsApi for OfflineDirections {
    async fn fetch_route(
        &self,
        _start: Coordinate,
        _end: Coordinate,
    ) -> Result<ProviderRoute, RouteError> {
        Err(RouteError::Http("sin conexión".to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ecoruta demo v{}", env!("CARGO_PKG_VERSION"));

    // A walk from the trailhead toward the waterfall, ~1.1 km in 50 fixes
    let start = Coordinate::new(19.8450, -97.3620);
    let end = Coordinate::new(19.8546, -97.3556);
    let trace: Vec<Coordinate> = (0..=50)
        .map(|i| {
            let t = i as f64 / 50.0;
            Coordinate::new(
                start.lat + (end.lat - start.lat) * t,
                start.lng + (end.lng - start.lng) * t,
            )
        })
        .collect();

    let place: PlaceRecord = serde_json::from_value(serde_json::json!({
        "nombre": "Cascada Velo de Novia",
        "coordenadas": { "lat": end.lat, "lng": end.lng }
    }))?;

    let mut config = NavConfig::default();
    config.position.poll_interval_ms = 50;

    let mut navigator = Navigator::new(
        config,
        MockLocationBackend::with_trace(trace),
        OfflineDirections,
    );
    let events = navigator.event_receiver();

    let route = navigator
        .start_navigation(&place)
        .await
        .map_err(|e| anyhow::anyhow!("no se pudo iniciar: {}", e))?;

    println!("Ruta planeada ({}):", if route.is_fallback { "línea recta" } else { "proveedor" });
    println!("  distancia estimada: {}", route.estimated_distance());
    println!("  tiempo estimado:    {}", route.estimated_time());
    for instruction in &route.instructions {
        println!("  {}", instruction);
    }
    println!();

    // Drain events until the walk reaches the destination
    loop {
        match events.recv()? {
            NavEvent::InstructionChanged(text) => println!("» {}", text),
            NavEvent::AchievementUnlocked(unlock) => {
                println!("🏅 Logro desbloqueado: {} ({:.2} km)", unlock.label, unlock.at_distance_km)
            }
            NavEvent::Fix(fix) => {
                let arrived = ecoruta::haversine_distance_km(fix.coordinate, end) < 0.02;
                if arrived {
                    break;
                }
            }
            _ => {}
        }
    }

    let record = navigator.stop_navigation()?;
    println!();
    println!(
        "Viaje terminado: {:.0} m, {} pasos estimados, {} puntos",
        record.distance_meters,
        record.steps,
        record.points.len()
    );

    Ok(())
}
