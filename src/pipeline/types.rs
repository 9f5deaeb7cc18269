use crate::analysis::{normalize_angle, Severity};
use serde::{Deserialize, Serialize};

/// Standardized tilt result for one photograph or an aggregated batch.
///
/// Angles are in degrees. `confidence` is always within `[0, 1]` and
/// `severity` is always derived from `corrected_vertical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltEstimate {
    /// Tilt from vertical measured in the image, before camera compensation
    pub raw_vertical: f64,

    /// Tilt from horizontal measured in the image, before camera compensation
    pub raw_horizontal: f64,

    /// Vertical tilt after subtracting device pitch
    pub corrected_vertical: f64,

    /// Horizontal tilt after subtracting device roll
    pub corrected_horizontal: f64,

    /// Confidence level (0-1, where 1 is highest confidence)
    pub confidence: f64,

    /// Number of accepted line segments behind this estimate
    pub line_count: usize,

    pub severity: Severity,

    /// Device tilt magnitude that was compensated for, if a sample was available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_compensation: Option<f64>,

    /// Why confidence may be low
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TiltEstimate {
    /// Estimate straight from the image, with corrected fields equal to raw ones.
    pub fn uncompensated(
        raw_vertical: f64,
        raw_horizontal: f64,
        confidence: f64,
        line_count: usize,
    ) -> Self {
        Self {
            raw_vertical,
            raw_horizontal,
            corrected_vertical: raw_vertical,
            corrected_horizontal: raw_horizontal,
            confidence: clamp_confidence(confidence),
            line_count,
            severity: Severity::from_tilt(raw_vertical),
            camera_compensation: None,
            warning: None,
        }
    }

    /// Zero-tilt, zero-confidence estimate carrying an explanation.
    pub fn degraded(warning: impl Into<String>) -> Self {
        Self::uncompensated(0.0, 0.0, 0.0, 0).with_warning(warning)
    }

    /// Batch-level estimate; carries no per-image raw detail.
    pub fn aggregate(vertical: f64, horizontal: f64, confidence: f64, line_count: usize) -> Self {
        Self::uncompensated(vertical, horizontal, confidence, line_count)
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Replace the corrected tilt and recompute severity from it.
    pub fn with_corrected(mut self, vertical: f64, horizontal: f64) -> Self {
        self.corrected_vertical = vertical;
        self.corrected_horizontal = horizontal;
        self.severity = Severity::from_tilt(vertical);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    pub fn with_camera_compensation(mut self, magnitude: f64) -> Self {
        self.camera_compensation = Some(magnitude);
        self
    }

    pub fn is_reliable(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }

    pub fn risk_points(&self) -> u8 {
        self.severity.risk_points()
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Detected straight segment in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Direction in degrees, normalized into (-90, 90].
    pub fn angle_degrees(&self) -> f64 {
        let dy = self.y2 - self.y1;
        let dx = self.x2 - self.x1;
        normalize_angle(dy.atan2(dx).to_degrees())
    }
}
