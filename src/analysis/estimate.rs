use crate::analysis::{mean, AngleBuckets};
use crate::config::ConfidenceConfig;
use crate::pipeline::TiltEstimate;

/// Reduces filtered angle buckets to a raw single-image tilt estimate
pub struct TiltEstimator {
    config: ConfidenceConfig,
}

impl Default for TiltEstimator {
    fn default() -> Self {
        Self::new(ConfidenceConfig::default())
    }
}

impl TiltEstimator {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn estimate(&self, buckets: &AngleBuckets) -> TiltEstimate {
        let raw_vertical = mean(&buckets.vertical).unwrap_or(0.0);
        let raw_horizontal = mean(&buckets.horizontal).unwrap_or(0.0);
        let line_count = buckets.line_count();
        let confidence = self.confidence(line_count, raw_vertical);

        TiltEstimate::uncompensated(raw_vertical, raw_horizontal, confidence, line_count)
    }

    /// Confidence from the number of accepted lines alone.
    pub fn base_confidence(&self, line_count: usize) -> f64 {
        self.config
            .tiers
            .iter()
            .find(|tier| line_count >= tier.min_lines)
            .map(|tier| tier.confidence)
            .unwrap_or(self.config.fallback)
    }

    /// Base confidence scaled down as the measured tilt grows.
    pub fn confidence(&self, line_count: usize, raw_vertical: f64) -> f64 {
        let penalty = 1.0 - raw_vertical / self.config.tilt_penalty_range_degrees;
        (self.base_confidence(line_count) * penalty).clamp(self.config.min, self.config.max)
    }
}
