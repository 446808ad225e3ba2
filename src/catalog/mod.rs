//! Place-record contract with the external catalog.
//!
//! The catalog is a read-mostly collaborator; the navigation core only needs
//! a display name and a normalized coordinate from each record. Records that
//! fail coordinate normalization resolve to a documented per-place fallback
//! so navigation can still start; the substitution is logged, never surfaced.

use crate::geo::{normalize_coordinate, Coordinate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A navigation target: where to go and what to call it.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    /// Target coordinate in canonical (lat, lng)
    pub coordinate: Coordinate,
    /// Display name shown in arrival instructions
    pub label: String,
}

impl Destination {
    pub fn new(coordinate: Coordinate, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            label: label.into(),
        }
    }
}

/// A place record as the catalog serves it. Only `nombre` and `coordenadas`
/// matter to the core; the rest rides along for completeness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Display name
    pub nombre: String,
    /// Coordinate in one of several historical shapes (see geo::normalize)
    pub coordenadas: Value,
    /// Street address, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    /// Cover image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
    /// Gallery image URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagenes: Option<Vec<String>>,
}

/// Fallback coordinates for places whose stored `coordenadas` cannot be
/// normalized. Keyed by display name; unknown places fall back to the
/// regional center.
const PLACE_FALLBACKS: &[(&str, Coordinate)] = &[
    (
        "Cascada Velo de Novia",
        Coordinate {
            lat: 19.8546,
            lng: -97.3556,
        },
    ),
    (
        "Mirador de Cristal",
        Coordinate {
            lat: 19.9313,
            lng: -97.9613,
        },
    ),
    (
        "Valle de las Piedras Encimadas",
        Coordinate {
            lat: 20.0456,
            lng: -98.0356,
        },
    ),
];

/// Regional center used when a failed place has no dedicated fallback.
const REGION_FALLBACK: Coordinate = Coordinate {
    lat: 19.85,
    lng: -97.36,
};

impl PlaceRecord {
    /// Resolve this record into a navigation destination.
    ///
    /// Normalization failures substitute the documented fallback coordinate
    /// for the place and log a warning. The user is intentionally not
    /// interrupted; the route may simply point at an approximate location.
    pub fn destination(&self) -> Destination {
        match normalize_coordinate(&self.coordenadas) {
            Ok(coordinate) => Destination::new(coordinate, self.nombre.clone()),
            Err(err) => {
                let fallback = fallback_for(&self.nombre);
                tracing::warn!(
                    "Coordinate for '{}' could not be normalized ({}), substituting fallback {}",
                    self.nombre,
                    err,
                    fallback
                );
                Destination::new(fallback, self.nombre.clone())
            }
        }
    }
}

fn fallback_for(nombre: &str) -> Coordinate {
    PLACE_FALLBACKS
        .iter()
        .find(|(name, _)| *name == nombre)
        .map(|(_, c)| *c)
        .unwrap_or(REGION_FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_destination_from_valid_record() {
        let place = PlaceRecord {
            nombre: "Cueva del Encanto".to_string(),
            coordenadas: json!({ "lat": 19.9, "lng": -97.5 }),
            direccion: None,
            imagen_url: None,
            imagenes: None,
        };

        let dest = place.destination();
        assert_eq!(dest.coordinate, Coordinate::new(19.9, -97.5));
        assert_eq!(dest.label, "Cueva del Encanto");
    }

    #[test]
    fn test_named_fallback_on_bad_coordinate() {
        let place = PlaceRecord {
            nombre: "Cascada Velo de Novia".to_string(),
            coordenadas: json!("no es una coordenada"),
            direccion: None,
            imagen_url: None,
            imagenes: None,
        };

        let dest = place.destination();
        assert_eq!(dest.coordinate, Coordinate::new(19.8546, -97.3556));
    }

    #[test]
    fn test_region_fallback_for_unknown_place() {
        let place = PlaceRecord {
            nombre: "Lugar Desconocido".to_string(),
            coordenadas: json!([200.0, 19.0]),
            direccion: None,
            imagen_url: None,
            imagenes: None,
        };

        assert_eq!(place.destination().coordinate, REGION_FALLBACK);
    }

    #[test]
    fn test_record_deserializes_minimal_payload() {
        let place: PlaceRecord =
            serde_json::from_value(json!({
                "nombre": "Mirador",
                "coordenadas": [19.93, -97.96]
            }))
            .unwrap();
        assert_eq!(place.nombre, "Mirador");
        assert!(place.direccion.is_none());
    }
}
