use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub classification: ClassificationConfig,
    pub confidence: ConfidenceConfig,
    pub compensation: CompensationConfig,
    pub aggregation: AggregationConfig,
    pub logging: LoggingConfig,
}

/// Edge and segment detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub blur_kernel_size: u32,
    pub canny_low: f64,
    pub canny_high: f64,
    pub min_line_length_fraction: f64,
    pub min_line_length_px: f64,
    pub max_line_gap_px: f64,
    pub hough_threshold: i32,
    pub rho_px: f64,
    pub theta_degrees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Segments steeper than this are treated as vertical
    pub vertical_threshold_degrees: f64,
    /// Segments flatter than this are treated as horizontal
    pub horizontal_threshold_degrees: f64,
    pub outlier_sigma: f64,
    pub min_outlier_samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceTier {
    pub min_lines: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub fallback: f64,
    pub tilt_penalty_range_degrees: f64,
    pub min: f64,
    pub max: f64,
    /// Checked in order; the first tier whose `min_lines` is met wins
    pub tiers: Vec<ConfidenceTier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensationConfig {
    pub missing_sample_penalty: f64,
    pub magnitude_range_degrees: f64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub reliable_confidence: f64,
    pub max_workers: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            canny_low: 60.0,
            canny_high: 180.0,
            min_line_length_fraction: 0.08,
            min_line_length_px: 40.0,
            max_line_gap_px: 15.0,
            hough_threshold: 60,
            rho_px: 1.0,
            theta_degrees: 1.0,
        }
    }
}

impl ExtractionConfig {
    /// Minimum accepted segment length for an image of the given width.
    pub fn min_line_length(&self, image_width: u32) -> f64 {
        (self.min_line_length_fraction * image_width as f64).max(self.min_line_length_px)
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            vertical_threshold_degrees: 65.0,
            horizontal_threshold_degrees: 25.0,
            outlier_sigma: 2.0,
            min_outlier_samples: 3,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            fallback: 0.25,
            tilt_penalty_range_degrees: 20.0,
            min: 0.1,
            max: 1.0,
            tiers: vec![
                ConfidenceTier { min_lines: 20, confidence: 0.95 },
                ConfidenceTier { min_lines: 12, confidence: 0.85 },
                ConfidenceTier { min_lines: 6, confidence: 0.70 },
                ConfidenceTier { min_lines: 3, confidence: 0.50 },
            ],
        }
    }
}

impl Default for CompensationConfig {
    fn default() -> Self {
        Self {
            missing_sample_penalty: 0.7,
            magnitude_range_degrees: 20.0,
            min_multiplier: 0.6,
            max_multiplier: 1.3,
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            reliable_confidence: 0.4,
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path)?;

        if content.trim_start().starts_with('{') {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: ConfigFormat) -> crate::Result<()> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let kernel = self.extraction.blur_kernel_size;
        if kernel == 0 || kernel % 2 == 0 {
            errors.push(format!("blur_kernel_size must be a positive odd number, got {}", kernel));
        }

        if self.extraction.canny_low >= self.extraction.canny_high {
            errors.push("canny_low must be less than canny_high".to_string());
        }

        if self.extraction.hough_threshold <= 0 {
            errors.push("hough_threshold must be positive".to_string());
        }

        if self.extraction.rho_px <= 0.0 || self.extraction.theta_degrees <= 0.0 {
            errors.push("Hough rho and theta resolutions must be positive".to_string());
        }

        let classification = &self.classification;
        if classification.horizontal_threshold_degrees >= classification.vertical_threshold_degrees
            || classification.vertical_threshold_degrees > 90.0
            || classification.horizontal_threshold_degrees < 0.0
        {
            errors.push(
                "Angle thresholds must satisfy 0 <= horizontal < vertical <= 90".to_string(),
            );
        }

        if classification.outlier_sigma <= 0.0 {
            errors.push("outlier_sigma must be positive".to_string());
        }

        let tiers_descending = self
            .confidence
            .tiers
            .windows(2)
            .all(|pair| pair[0].min_lines > pair[1].min_lines);
        if !tiers_descending {
            errors.push("Confidence tiers must be ordered by descending min_lines".to_string());
        }

        if self.confidence.min > self.confidence.max {
            errors.push("Confidence min must not exceed max".to_string());
        }

        if self.compensation.min_multiplier > self.compensation.max_multiplier {
            errors.push("Compensation min_multiplier must not exceed max_multiplier".to_string());
        }

        if self.compensation.magnitude_range_degrees <= 0.0
            || self.confidence.tilt_penalty_range_degrees <= 0.0
        {
            errors.push("Penalty ranges must be positive".to_string());
        }

        if self.aggregation.max_workers == 0 {
            errors.push("max_workers must be at least 1".to_string());
        }

        if let Err(error) = self.logging.validate() {
            errors.push(error);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigFormat {
    Json,
    Toml,
}

pub fn load_config_or_default(config_path: Option<&str>) -> Config {
    match config_path {
        Some(path) => match Config::load_from_file(path) {
            Ok(config) => {
                if let Err(errors) = config.validate() {
                    for error in &errors {
                        tracing::warn!(path = path, "Configuration validation error: {}", error);
                    }
                    tracing::warn!("Using default configuration instead");
                    Config::default()
                } else {
                    config
                }
            }
            Err(e) => {
                tracing::warn!("Failed to load config from '{}': {}", path, e);
                Config::default()
            }
        },
        None => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.canny_low, 60.0);
        assert_eq!(config.extraction.canny_high, 180.0);
        assert_eq!(config.aggregation.reliable_confidence, 0.4);
        assert!(config.aggregation.max_workers >= 1);
    }

    #[test]
    fn test_min_line_length() {
        let extraction = ExtractionConfig::default();
        assert_eq!(extraction.min_line_length(100), 40.0);
        assert!((extraction.min_line_length(2048) - 163.84).abs() < 1e-9);
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut config = Config::default();
        config.extraction.blur_kernel_size = 4;
        config.classification.horizontal_threshold_degrees = 70.0;
        config.aggregation.max_workers = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_round_trip_through_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tilt.toml");

        let mut config = Config::default();
        config.aggregation.max_workers = 3;
        config.save_to_file(&path, ConfigFormat::Toml).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.aggregation.max_workers, 3);
        assert_eq!(loaded.confidence.tiers, config.confidence.tiers);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tilt.json");
        fs::write(&path, r#"{ "aggregation": { "reliable_confidence": 0.5 } }"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.aggregation.reliable_confidence, 0.5);
        assert_eq!(loaded.extraction.hough_threshold, 60);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = load_config_or_default(Some("/definitely/not/here.toml"));
        assert_eq!(config.extraction.blur_kernel_size, 5);
    }
}
