//! Directions provider client.
//!
//! The production provider is a Mapbox-style directions API: origin and
//! destination travel as `lng,lat` pairs in the path, the response carries
//! GeoJSON geometry in (lng, lat) order and per-step maneuvers whose
//! instruction text may contain markup. Both quirks are absorbed here so the
//! rest of the crate only ever sees canonical coordinates and plain text.

use crate::geo::Coordinate;
use crate::routing::types::{RouteError, RoutingConfig};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// A parsed route candidate, provider quirks already normalized.
#[derive(Debug, Clone)]
pub struct ProviderRoute {
    /// Geometry in canonical (lat, lng) order
    pub geometry: Vec<Coordinate>,
    /// Total distance in meters
    pub distance_m: f64,
    /// Total duration in seconds
    pub duration_s: f64,
    /// Step-level maneuvers in route order
    pub steps: Vec<ProviderStep>,
}

/// One maneuver step of a provider route.
#[derive(Debug, Clone)]
pub struct ProviderStep {
    /// Distance covered by this step in meters
    pub distance_m: f64,
    /// Maneuver category, e.g. "depart", "turn", "arrive"
    pub maneuver_type: String,
    /// Maneuver modifier, e.g. "left", "slight right"
    pub modifier: Option<String>,
    /// Instruction text, markup already stripped
    pub instruction: String,
}

/// An external directions service.
pub trait DirectionsApi: Send + Sync + 'static {
    /// Fetch the best driving route between two coordinates.
    fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> impl Future<Output = Result<ProviderRoute, RouteError>> + Send;
}

/// HTTP client for a Mapbox-style directions API.
pub struct MapboxDirections {
    http: reqwest::Client,
    config: RoutingConfig,
}

impl MapboxDirections {
    /// Create a client from routing configuration.
    pub fn new(config: RoutingConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, config }
    }

    fn request_url(&self, start: Coordinate, end: Coordinate) -> String {
        let [start_lng, start_lat] = start.to_lng_lat();
        let [end_lng, end_lat] = end.to_lng_lat();
        format!(
            "{}/{}/{},{};{},{}?alternatives=false&geometries=geojson&language=es&overview=full&steps=true&access_token={}",
            self.config.base_url,
            self.config.profile,
            start_lng,
            start_lat,
            end_lng,
            end_lat,
            self.config.access_token,
        )
    }
}

impl DirectionsApi for MapboxDirections {
    async fn fetch_route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<ProviderRoute, RouteError> {
        let url = self.request_url(start, end);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RouteError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status.as_u16()));
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| RouteError::InvalidResponse(e.to_string()))?;

        let route = body.routes.into_iter().next().ok_or(RouteError::NoRoutes)?;

        let geometry = route
            .geometry
            .coordinates
            .iter()
            .map(|pair| Coordinate::new(pair[1], pair[0]))
            .collect();

        let steps = route
            .legs
            .into_iter()
            .next()
            .map(|leg| {
                leg.steps
                    .into_iter()
                    .map(|step| ProviderStep {
                        distance_m: step.distance,
                        maneuver_type: step.maneuver.maneuver_type,
                        modifier: step.maneuver.modifier,
                        instruction: strip_html(&step.maneuver.instruction),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ProviderRoute {
            geometry,
            distance_m: route.distance,
            duration_s: route.duration,
            steps,
        })
    }
}

/// Remove markup tags from provider instruction text.
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

// Wire shapes of the directions response.

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    distance: f64,
    duration: f64,
    geometry: WireGeometry,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    /// (lng, lat) pairs, per GeoJSON
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
struct WireStep {
    distance: f64,
    maneuver: WireManeuver,
}

#[derive(Debug, Deserialize)]
struct WireManeuver {
    #[serde(rename = "type")]
    maneuver_type: String,
    #[serde(default)]
    modifier: Option<String>,
    #[serde(default)]
    instruction: String,
}
