//! Coordinate normalization across the wire shapes a place record may use.
//!
//! The catalog stores `coordenadas` in one of four historical shapes. Each
//! shape is attempted in a fixed priority order and the result is a typed
//! `Ok`/`Err`, never a silent guess:
//!
//! 1. a 2-element array already in (lat, lng) order
//! 2. an object with named `lat`/`lng` fields
//! 3. an object indexed by `"0"`/`"1"` keys (lat, lng)
//! 4. a GeoJSON-style object holding `coordinates` in (lng, lat) order

use crate::geo::Coordinate;
use serde_json::Value;
use thiserror::Error;

/// Why a raw coordinate value could not be normalized.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// None of the recognized shapes matched
    #[error("unrecognized coordinate shape")]
    UnrecognizedShape,

    /// A component was missing or not a finite number
    #[error("coordinate component is not a finite number")]
    NotFinite,

    /// Latitude outside [-90, 90]
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180]
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Normalize a raw `coordenadas` value into a canonical (lat, lng) pair.
pub fn normalize_coordinate(raw: &Value) -> Result<Coordinate, CoordinateError> {
    let (lat, lng) = parse_shape(raw)?;
    validate(lat, lng)
}

/// Try each recognized shape in priority order, returning raw (lat, lng).
fn parse_shape(raw: &Value) -> Result<(f64, f64), CoordinateError> {
    // Shape 1: [lat, lng]
    if let Value::Array(items) = raw {
        if items.len() == 2 {
            let lat = number_of(&items[0])?;
            let lng = number_of(&items[1])?;
            return Ok((lat, lng));
        }
        return Err(CoordinateError::UnrecognizedShape);
    }

    if let Value::Object(map) = raw {
        // Shape 2: { lat, lng }
        if let (Some(lat), Some(lng)) = (map.get("lat"), map.get("lng")) {
            return Ok((number_of(lat)?, number_of(lng)?));
        }

        // Shape 3: { "0": lat, "1": lng }
        if let (Some(lat), Some(lng)) = (map.get("0"), map.get("1")) {
            return Ok((number_of(lat)?, number_of(lng)?));
        }

        // Shape 4: GeoJSON { coordinates: [lng, lat] }
        if let Some(Value::Array(pair)) = map.get("coordinates") {
            if pair.len() == 2 {
                let lng = number_of(&pair[0])?;
                let lat = number_of(&pair[1])?;
                return Ok((lat, lng));
            }
        }
    }

    Err(CoordinateError::UnrecognizedShape)
}

fn number_of(value: &Value) -> Result<f64, CoordinateError> {
    match value.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(CoordinateError::NotFinite),
    }
}

fn validate(lat: f64, lng: f64) -> Result<Coordinate, CoordinateError> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(CoordinateError::NotFinite);
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordinateError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(CoordinateError::LongitudeOutOfRange(lng));
    }
    Ok(Coordinate::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_four_shapes_same_point() {
        let expected = Coordinate::new(19.85, -97.36);

        let shapes = [
            json!([19.85, -97.36]),
            json!({ "lat": 19.85, "lng": -97.36 }),
            json!({ "0": 19.85, "1": -97.36 }),
            json!({ "type": "Point", "coordinates": [-97.36, 19.85] }),
        ];

        for shape in &shapes {
            assert_eq!(normalize_coordinate(shape).unwrap(), expected, "{}", shape);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            normalize_coordinate(&json!([95.0, -97.36])),
            Err(CoordinateError::LatitudeOutOfRange(95.0))
        );
        assert_eq!(
            normalize_coordinate(&json!([19.85, -200.0])),
            Err(CoordinateError::LongitudeOutOfRange(-200.0))
        );
    }

    #[test]
    fn test_not_finite() {
        assert_eq!(
            normalize_coordinate(&json!(["19.85", -97.36])),
            Err(CoordinateError::NotFinite)
        );
        assert_eq!(
            normalize_coordinate(&json!({ "lat": null, "lng": -97.36 })),
            Err(CoordinateError::NotFinite)
        );
    }

    #[test]
    fn test_unrecognized_shapes() {
        for raw in [
            json!(null),
            json!("19.85,-97.36"),
            json!([19.85]),
            json!([19.85, -97.36, 0.0]),
            json!({ "latitude": 19.85, "longitude": -97.36 }),
            json!({ "coordinates": "nope" }),
        ] {
            assert_eq!(
                normalize_coordinate(&raw),
                Err(CoordinateError::UnrecognizedShape),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_geojson_flips_order() {
        let c = normalize_coordinate(&json!({ "coordinates": [-97.3556, 19.8546] })).unwrap();
        assert_eq!(c.lat, 19.8546);
        assert_eq!(c.lng, -97.3556);
    }
}
