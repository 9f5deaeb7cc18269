//! Angle bucketing and per-bucket outlier rejection for detected segments.

use crate::config::ClassificationConfig;
use crate::pipeline::LineSegment;

/// Tilt samples in degrees, split by dominant direction.
///
/// Vertical samples are stored as deviation from vertical (`90 - |angle|`),
/// horizontal samples as deviation from horizontal (`|angle|`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleBuckets {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

impl AngleBuckets {
    pub fn new(vertical: Vec<f64>, horizontal: Vec<f64>) -> Self {
        Self { vertical, horizontal }
    }

    pub fn line_count(&self) -> usize {
        self.vertical.len() + self.horizontal.len()
    }
}

/// Filtered buckets plus what was thrown away on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedLines {
    pub buckets: AngleBuckets,
    pub diagonal: usize,
    pub outliers: usize,
}

pub struct LineClassifier {
    config: ClassificationConfig,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(ClassificationConfig::default())
    }
}

impl LineClassifier {
    pub fn new(config: ClassificationConfig) -> Self {
        Self { config }
    }

    /// Sort segments into vertical and horizontal buckets, discarding diagonals.
    pub fn bucket(&self, segments: &[LineSegment]) -> (AngleBuckets, usize) {
        let mut buckets = AngleBuckets::default();
        let mut diagonal = 0;

        for segment in segments {
            let angle = segment.angle_degrees().abs();
            if angle > self.config.vertical_threshold_degrees {
                buckets.vertical.push(90.0 - angle);
            } else if angle < self.config.horizontal_threshold_degrees {
                buckets.horizontal.push(angle);
            } else {
                diagonal += 1;
            }
        }

        (buckets, diagonal)
    }

    pub fn classify(&self, segments: &[LineSegment]) -> ClassifiedLines {
        let (raw, diagonal) = self.bucket(segments);
        let vertical = self.filter(&raw.vertical);
        let horizontal = self.filter(&raw.horizontal);
        let outliers = raw.line_count() - vertical.len() - horizontal.len();

        ClassifiedLines {
            buckets: AngleBuckets::new(vertical, horizontal),
            diagonal,
            outliers,
        }
    }

    pub fn filter(&self, samples: &[f64]) -> Vec<f64> {
        reject_outliers(samples, self.config.outlier_sigma, self.config.min_outlier_samples)
    }
}

/// Normalize an angle in degrees into (-90, 90].
pub fn normalize_angle(degrees: f64) -> f64 {
    let mut angle = degrees % 180.0;
    if angle > 90.0 {
        angle -= 180.0;
    } else if angle <= -90.0 {
        angle += 180.0;
    }
    angle
}

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Relative slack on the cut-off, so a sample sitting exactly on it is
/// rejected regardless of rounding in the mean and deviation.
const CUTOFF_TOLERANCE: f64 = 1e-9;

pub fn population_std_dev(samples: &[f64], mean: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

/// Drop samples lying `sigma` standard deviations or more from the mean.
///
/// Fewer than `min_samples` samples pass through untouched, as does a bucket
/// with zero spread.
pub fn reject_outliers(samples: &[f64], sigma: f64, min_samples: usize) -> Vec<f64> {
    if samples.len() < min_samples {
        return samples.to_vec();
    }
    let Some(mean) = mean(samples) else {
        return Vec::new();
    };
    let std_dev = population_std_dev(samples, mean);
    if std_dev == 0.0 {
        return samples.to_vec();
    }

    let limit = sigma * std_dev * (1.0 - CUTOFF_TOLERANCE);
    samples
        .iter()
        .copied()
        .filter(|x| (x - mean).abs() < limit)
        .collect()
}
