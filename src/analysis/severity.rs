use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal out-of-plumb classification of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    None,
    Minor,
    Moderate,
    Severe,
}

pub const MINOR_TILT_DEGREES: f64 = 0.25;
pub const MODERATE_TILT_DEGREES: f64 = 2.0;
pub const SEVERE_TILT_DEGREES: f64 = 5.0;

impl Severity {
    /// Classify a corrected vertical tilt in degrees.
    ///
    /// Each band is closed on its lower bound. Negative and NaN input
    /// classifies as `None`.
    pub fn from_tilt(tilt_degrees: f64) -> Self {
        if tilt_degrees >= SEVERE_TILT_DEGREES {
            Severity::Severe
        } else if tilt_degrees >= MODERATE_TILT_DEGREES {
            Severity::Moderate
        } else if tilt_degrees >= MINOR_TILT_DEGREES {
            Severity::Minor
        } else {
            Severity::None
        }
    }

    /// Points contributed to an external aggregate risk score.
    pub fn risk_points(&self) -> u8 {
        match self {
            Severity::None => 0,
            Severity::Minor => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Minor => "MINOR",
            Severity::Moderate => "MODERATE",
            Severity::Severe => "SEVERE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
