//! Domain data structures for upstream readings and normalized measurement points.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
/// Geographic position attached to an upstream reading.
///
/// Both axes are optional on the wire; a `null` or non-numeric axis is kept as
/// `None` so the record can be rejected during normalization instead of
/// failing the whole page.
pub struct Coordinates {
    /// Latitude in decimal degrees.
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of the upstream location a sensor belongs to.
pub struct LocationId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Untrusted reading as delivered by the upstream measurement API.
pub struct RawReading {
    /// Position of the sensor; `None` when absent or not an object.
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<Coordinates>,
    /// Pollutant index; `None` when missing or not a number.
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    /// Upstream location identifier, numeric or textual.
    #[serde(default, deserialize_with = "lenient_location")]
    pub locations_id: Option<LocationId>,
}

impl RawReading {
    /// Build a reading from plain parts, mostly useful for fakes and tests.
    #[must_use]
    pub fn new(coordinates: Option<(f64, f64)>, value: f64, locations_id: Option<&str>) -> Self {
        Self {
            coordinates: coordinates.map(|(latitude, longitude)| Coordinates {
                latitude: Some(latitude),
                longitude: Some(longitude),
            }),
            value: Some(value),
            locations_id: locations_id.map(|id| LocationId(id.to_owned())),
        }
    }

    /// Decode one entry of an upstream `results` array.
    ///
    /// Returns `None` for entries that are not JSON objects; every field of an
    /// object is decoded leniently, so objects always succeed.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        if value.is_object() {
            serde_json::from_value(value).ok()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Validated, geolocated measurement ready for visualization.
///
/// `lat` and `lng` are finite and `value` lies within `[0, 100]`.
pub struct NormalizedPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Display label derived from the location identifier.
    pub city: String,
    /// Pollutant index.
    pub value: f64,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_f64))
}

fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .filter(Value::is_object)
        .and_then(|object| serde_json::from_value(object).ok()))
}

fn lenient_location<'de, D>(deserializer: D) -> Result<Option<LocationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(number)) => Some(LocationId(number.to_string())),
        Some(Value::String(text)) if !text.trim().is_empty() => Some(LocationId(text)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_upstream_record() {
        let reading: RawReading = serde_json::from_str(
            r#"{"datetime":{"utc":"2024-01-01T00:00:00Z"},"value":12.5,
                "coordinates":{"latitude":52.1,"longitude":13.4},"sensorsId":7,"locationsId":2178}"#,
        )
        .expect("valid record");

        assert_eq!(reading.value, Some(12.5));
        assert_eq!(reading.locations_id, Some(LocationId("2178".to_owned())));
        let coordinates = reading.coordinates.expect("coordinates present");
        assert_eq!(coordinates.latitude, Some(52.1));
        assert_eq!(coordinates.longitude, Some(13.4));
    }

    #[test]
    fn tolerates_odd_field_types() {
        let reading: RawReading = serde_json::from_str(
            r#"{"value":"n/a","coordinates":{"latitude":null,"longitude":"x"},"locationsId":""}"#,
        )
        .expect("odd but well-formed record");

        assert_eq!(reading.value, None);
        assert_eq!(reading.locations_id, None);
        assert_eq!(reading.coordinates, Some(Coordinates::default()));
    }

    #[test]
    fn non_object_coordinates_decode_as_absent() {
        for coordinates in [r#""n/a""#, "[]", "42", "true"] {
            let json = format!(r#"{{"value":11.0,"coordinates":{coordinates},"locationsId":5}}"#);
            let reading: RawReading = serde_json::from_str(&json).expect("record still decodes");
            assert_eq!(reading.coordinates, None, "coordinates {coordinates}");
            assert_eq!(reading.value, Some(11.0));
        }
    }

    #[test]
    fn mixed_results_keep_every_object() {
        let results: Vec<Value> = serde_json::from_str(
            r#"[
                {"value":30.0,"coordinates":{"latitude":10.0,"longitude":20.0},"locationsId":1},
                {"value":11.0,"coordinates":"n/a","locationsId":2},
                7,
                "garbage",
                null
            ]"#,
        )
        .expect("valid json");

        let readings: Vec<RawReading> = results
            .into_iter()
            .filter_map(RawReading::from_value)
            .collect();

        assert_eq!(readings.len(), 2);
        assert!(readings.first().is_some_and(|reading| reading.coordinates.is_some()));
        assert!(readings.last().is_some_and(|reading| reading.coordinates.is_none()));
    }

    #[test]
    fn missing_fields_default_to_none() {
        let reading: RawReading = serde_json::from_str("{}").expect("empty record");
        assert_eq!(reading, RawReading::default());
    }
}
