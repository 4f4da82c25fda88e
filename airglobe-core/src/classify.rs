//! Severity classification of pollutant readings.
//!
//! The threshold table below is the single source of truth for both
//! server-side annotation and the renderer's color/scale choices.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Discrete severity category, ordered from least to most severe.
pub enum SeverityBand {
    /// Clean air.
    Good,
    /// Acceptable, sensitive groups may notice.
    Moderate,
    /// Health effects for the general public.
    Unhealthy,
    /// Emergency conditions.
    Hazardous,
}

/// Inclusive upper bound of each band, in ascending order.
/// Anything above the last bound is [`SeverityBand::Hazardous`].
pub const THRESHOLDS: &[(f64, SeverityBand)] = &[
    (12.0, SeverityBand::Good),
    (35.0, SeverityBand::Moderate),
    (55.0, SeverityBand::Unhealthy),
];

/// Map a pollutant reading to its severity band.
#[must_use]
pub fn classify(value: f64) -> SeverityBand {
    THRESHOLDS
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map_or(SeverityBand::Hazardous, |(_, band)| *band)
}

impl SeverityBand {
    /// All bands in ascending severity.
    pub const ALL: [Self; 4] = [Self::Good, Self::Moderate, Self::Unhealthy, Self::Hazardous];

    /// Hex display color.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#00ff64",
            Self::Moderate => "#ffdc00",
            Self::Unhealthy => "#ff6400",
            Self::Hazardous => "#ff0000",
        }
    }

    /// Relative marker size for the renderer; never shrinks as severity grows.
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            Self::Good | Self::Moderate => 5.0,
            Self::Unhealthy | Self::Hazardous => 10.0,
        }
    }

    /// Marker opacity for the renderer.
    #[must_use]
    pub fn opacity(self) -> f64 {
        0.6
    }

    /// Human-friendly name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Unhealthy => "Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.label())
    }
}
