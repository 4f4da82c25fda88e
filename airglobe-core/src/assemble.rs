//! Final packaging of normalized points.

use serde::Serialize;

use crate::classify::{SeverityBand, classify};
use crate::model::NormalizedPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Whether assembled points carry severity metadata.
pub enum Annotation {
    /// Bare `{lat, lng, city, value}` points.
    None,
    /// Points additionally carry their severity band and display color.
    #[default]
    Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// One element of the outward payload.
pub struct AssembledPoint {
    #[serde(flatten)]
    /// The normalized point, unchanged.
    pub point: NormalizedPoint,
    /// Severity band, present when annotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityBand>,
    /// Display color of the band, present when annotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

/// Package points for the caller, preserving order and without re-validating.
#[must_use]
pub fn assemble(points: Vec<NormalizedPoint>, annotation: Annotation) -> Vec<AssembledPoint> {
    points
        .into_iter()
        .map(|point| {
            let band = (annotation == Annotation::Severity).then(|| classify(point.value));
            AssembledPoint {
                severity: band,
                color: band.map(SeverityBand::color),
                point,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn point(value: f64) -> NormalizedPoint {
        NormalizedPoint {
            lat: 10.0,
            lng: 20.0,
            city: "Location 7".to_owned(),
            value,
        }
    }

    #[test]
    fn bare_shape_is_pass_through() {
        let assembled = assemble(vec![point(1.0), point(2.0)], Annotation::None);
        let json = serde_json::to_value(&assembled).expect("serializable");
        assert_eq!(
            json,
            json!([
                {"lat": 10.0, "lng": 20.0, "city": "Location 7", "value": 1.0},
                {"lat": 10.0, "lng": 20.0, "city": "Location 7", "value": 2.0},
            ])
        );
    }

    #[test]
    fn annotated_shape_carries_band_and_color() {
        let assembled = assemble(vec![point(30.0)], Annotation::Severity);
        let json = serde_json::to_value(&assembled).expect("serializable");
        assert_eq!(
            json,
            json!([{
                "lat": 10.0, "lng": 20.0, "city": "Location 7", "value": 30.0,
                "severity": "moderate", "color": "#ffdc00",
            }])
        );
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(assemble(Vec::new(), Annotation::Severity).is_empty());
    }
}
