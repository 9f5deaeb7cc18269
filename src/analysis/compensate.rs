use crate::config::CompensationConfig;
use crate::orientation::OrientationSample;
use crate::pipeline::TiltEstimate;

pub const MISSING_ORIENTATION_WARNING: &str = "no camera tilt data (reduced accuracy)";

/// Removes the device's own attitude from an image-derived tilt estimate
pub struct CameraCompensator {
    config: CompensationConfig,
}

impl Default for CameraCompensator {
    fn default() -> Self {
        Self::new(CompensationConfig::default())
    }
}

impl CameraCompensator {
    pub fn new(config: CompensationConfig) -> Self {
        Self { config }
    }

    pub fn compensate(&self, raw: &TiltEstimate, sample: Option<&OrientationSample>) -> TiltEstimate {
        match sample {
            None => raw
                .clone()
                .with_corrected(raw.raw_vertical, raw.raw_horizontal)
                .with_confidence(raw.confidence * self.config.missing_sample_penalty)
                .with_warning(MISSING_ORIENTATION_WARNING),
            Some(sample) => {
                let vertical = (raw.raw_vertical - sample.pitch.abs()).max(0.0);
                let horizontal = (raw.raw_horizontal - sample.roll.abs()).max(0.0);
                let multiplier = self.confidence_multiplier(sample.magnitude);

                raw.clone()
                    .with_corrected(vertical, horizontal)
                    .with_confidence(raw.confidence * multiplier)
                    .with_camera_compensation(sample.magnitude)
            }
        }
    }

    /// Confidence multiplier for a device tilt magnitude.
    ///
    /// A nearly level device can push the multiplier above 1.
    pub fn confidence_multiplier(&self, magnitude: f64) -> f64 {
        (1.0 - magnitude / self.config.magnitude_range_degrees)
            .clamp(self.config.min_multiplier, self.config.max_multiplier)
    }
}
