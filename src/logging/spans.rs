//! Structured spans for hierarchical logging
//!
//! One [`AnalysisSpan`] per image and one [`BatchSpan`] per aggregated batch,
//! so every record of a run can be correlated.

use crate::pipeline::{AnalysisError, TiltEstimate};
use std::time::Instant;
use tracing::{field, span, Level, Span};
use uuid::Uuid;

/// Span for one image's trip through the pipeline
pub struct AnalysisSpan {
    span: Span,
    start_time: Instant,
}

impl AnalysisSpan {
    pub fn new(image_index: Option<usize>, correlation_id: Option<Uuid>) -> Self {
        let correlation_id = correlation_id.or_else(crate::logging::get_correlation_id);
        let span = span!(
            Level::INFO,
            "tilt_analysis",
            image_index = image_index,
            correlation_id = correlation_id.map(field::display),
            width = field::Empty,
            height = field::Empty,
            segments = field::Empty,
            vertical_lines = field::Empty,
            horizontal_lines = field::Empty,
            camera_compensation = field::Empty,
            corrected_vertical = field::Empty,
            confidence = field::Empty,
            severity = field::Empty,
            failure = field::Empty,
            execution_time_ms = field::Empty,
        );

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    pub fn record_extraction(&self, width: u32, height: u32, segments: usize) {
        self.span.record("width", width);
        self.span.record("height", height);
        self.span.record("segments", segments);
        tracing::debug!(
            parent: &self.span,
            segments = segments,
            image_size = format!("{}x{}", width, height),
            "Line extraction completed"
        );
    }

    pub fn record_classification(&self, vertical: usize, horizontal: usize, diagonal: usize, outliers: usize) {
        self.span.record("vertical_lines", vertical);
        self.span.record("horizontal_lines", horizontal);
        tracing::debug!(
            parent: &self.span,
            vertical = vertical,
            horizontal = horizontal,
            diagonal = diagonal,
            outliers = outliers,
            "Segments classified"
        );
    }

    pub fn record_compensation(&self, magnitude: Option<f64>) {
        match magnitude {
            Some(magnitude) => {
                self.span.record("camera_compensation", magnitude);
                tracing::debug!(
                    parent: &self.span,
                    camera_tilt = format!("{:.2}°", magnitude),
                    "Camera tilt compensated"
                );
            }
            None => tracing::debug!(parent: &self.span, "No orientation sample for this image"),
        }
    }

    pub fn record_result(&self, estimate: &TiltEstimate) {
        let duration = self.start_time.elapsed();
        self.span.record("corrected_vertical", estimate.corrected_vertical);
        self.span.record("confidence", estimate.confidence);
        self.span.record("severity", estimate.severity.label());
        self.span.record("execution_time_ms", duration.as_millis() as u64);

        tracing::info!(
            parent: &self.span,
            corrected_vertical = format!("{:.3}°", estimate.corrected_vertical),
            corrected_horizontal = format!("{:.3}°", estimate.corrected_horizontal),
            confidence = format!("{:.3}", estimate.confidence),
            line_count = estimate.line_count,
            severity = estimate.severity.label(),
            execution_time_ms = duration.as_millis() as u64,
            "Tilt analysis completed"
        );
    }

    pub fn record_failure(&self, error: &AnalysisError) {
        self.span.record("failure", field::debug(error.kind()));
        tracing::warn!(parent: &self.span, error = %error, "Tilt analysis failed");
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

/// Span for a multi-image aggregation
pub struct BatchSpan {
    span: Span,
    start_time: Instant,
}

impl BatchSpan {
    pub fn new(batch_id: Uuid, images: usize) -> Self {
        let span = span!(
            Level::INFO,
            "tilt_batch",
            batch_id = %batch_id,
            images = images,
            reliable = field::Empty,
            failures = field::Empty,
        );

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    pub fn record_image_failure(&self, index: usize, source: &str, error: &AnalysisError) {
        tracing::warn!(
            parent: &self.span,
            image_index = index,
            source = source,
            failure = ?error.kind(),
            error = %error,
            "Image excluded from aggregate"
        );
    }

    pub fn record_aggregate(&self, aggregate: &TiltEstimate, reliable: usize, failures: usize) {
        self.span.record("reliable", reliable);
        self.span.record("failures", failures);
        tracing::info!(
            parent: &self.span,
            reliable = reliable,
            failures = failures,
            corrected_vertical = format!("{:.3}°", aggregate.corrected_vertical),
            confidence = format!("{:.3}", aggregate.confidence),
            severity = aggregate.severity.label(),
            execution_time_ms = self.start_time.elapsed().as_millis() as u64,
            "Batch aggregated"
        );
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}
