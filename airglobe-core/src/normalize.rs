//! Validation and cleaning of untrusted upstream readings.

use std::ops::RangeInclusive;

use crate::model::{NormalizedPoint, RawReading};

/// Pollutant index range accepted as a plausible reading.
pub const VALID_VALUE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Convert raw readings into validated points, dropping every record that
/// fails a domain check. Order of surviving records is preserved.
#[must_use]
pub fn normalize(raw: Vec<RawReading>) -> Vec<NormalizedPoint> {
    raw.into_iter().filter_map(normalize_one).collect()
}

/// Normalize a single reading, or `None` when it is rejected.
///
/// Coordinates are checked for presence, so `0.0` on either axis is kept.
#[must_use]
pub fn normalize_one(reading: RawReading) -> Option<NormalizedPoint> {
    let coordinates = reading.coordinates?;
    let lat = coordinates.latitude.filter(|lat| lat.is_finite())?;
    let lng = coordinates.longitude.filter(|lng| lng.is_finite())?;
    let value = reading
        .value
        .filter(|value| VALID_VALUE_RANGE.contains(value))?;

    let city = reading.locations_id.map_or_else(
        || "Location Unknown".to_owned(),
        |id| format!("Location {id}"),
    );

    Some(NormalizedPoint {
        lat,
        lng,
        city,
        value,
    })
}
