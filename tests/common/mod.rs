#![allow(dead_code)]

use image::{DynamicImage, RgbImage};
use plumb_tilt::*;
use std::sync::Arc;

/// Returns the same segments for every image
pub struct StubDetector {
    segments: Vec<LineSegment>,
}

impl StubDetector {
    pub fn new(segments: Vec<LineSegment>) -> Arc<Self> {
        Arc::new(Self { segments })
    }
}

impl LineDetector for StubDetector {
    fn name(&self) -> &str {
        "stub"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<LineSegment>, AnalysisError> {
        Ok(self.segments.clone())
    }
}

/// Always fails the way a broken native backend would
pub struct FailingDetector;

impl LineDetector for FailingDetector {
    fn name(&self) -> &str {
        "failing"
    }

    fn detect(&self, _image: &DynamicImage) -> Result<Vec<LineSegment>, AnalysisError> {
        Err(AnalysisError::Extraction {
            reason: "backend crashed".to_string(),
        })
    }
}

/// Segment of length 200 at `angle_degrees` from the image x axis
pub fn segment_at(angle_degrees: f64) -> LineSegment {
    let radians = angle_degrees.to_radians();
    LineSegment::new(10.0, 10.0, 10.0 + 200.0 * radians.cos(), 10.0 + 200.0 * radians.sin())
}

/// Near-vertical segments leaning by the given amounts
pub fn leaning_verticals(tilts: &[f64]) -> Vec<LineSegment> {
    tilts.iter().map(|tilt| segment_at(90.0 - tilt)).collect()
}

pub fn blank_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(320, 240))
}

pub fn pipeline_with(segments: Vec<LineSegment>) -> TiltPipeline {
    TiltPipeline::builder(plumb_tilt::config::Config::default())
        .with_detector(StubDetector::new(segments))
        .build()
}
