use crate::algorithms::LineBackend;
use crate::analysis::{CameraCompensator, LineClassifier, TiltEstimator};
use crate::config::Config;
use crate::data::ImageSource;
use crate::logging::AnalysisSpan;
use crate::orientation::OrientationSample;
use crate::pipeline::{AnalysisError, LineDetector, LineExtractionStage, PipelineStage, TiltEstimate};
use image::DynamicImage;
use std::sync::Arc;
use tracing::debug;

/// Builder for a single-image tilt pipeline
pub struct TiltPipelineBuilder {
    config: Config,
    backend: Option<LineBackend>,
}

impl TiltPipelineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            backend: None,
        }
    }

    /// Use a specific detector instead of probing for the default one
    pub fn with_detector(mut self, detector: Arc<dyn LineDetector>) -> Self {
        self.backend = Some(LineBackend::from_detector(detector));
        self
    }

    pub fn with_backend(mut self, backend: LineBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> TiltPipeline {
        let backend = self
            .backend
            .unwrap_or_else(|| LineBackend::probe(&self.config.extraction));
        debug!(backend = ?backend, "Tilt pipeline built");

        TiltPipeline {
            extraction: LineExtractionStage::new(backend),
            classifier: LineClassifier::new(self.config.classification.clone()),
            estimator: TiltEstimator::new(self.config.confidence.clone()),
            compensator: CameraCompensator::new(self.config.compensation.clone()),
            config: self.config,
        }
    }
}

/// Extraction, classification, estimation and compensation for one image
pub struct TiltPipeline {
    extraction: LineExtractionStage,
    classifier: LineClassifier,
    estimator: TiltEstimator,
    compensator: CameraCompensator,
    config: Config,
}

impl TiltPipeline {
    /// Pipeline with the default detector for this build
    pub fn new(config: Config) -> Self {
        TiltPipelineBuilder::new(config).build()
    }

    pub fn builder(config: Config) -> TiltPipelineBuilder {
        TiltPipelineBuilder::new(config)
    }

    pub fn backend(&self) -> &LineBackend {
        self.extraction.backend()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyze(
        &self,
        image: &DynamicImage,
        orientation: Option<&OrientationSample>,
    ) -> Result<TiltEstimate, AnalysisError> {
        self.run(image, orientation, None)
    }

    /// Like [`analyze`](Self::analyze), but failures become a zero-confidence
    /// estimate whose warning names the failure.
    pub fn analyze_or_degrade(
        &self,
        image: &DynamicImage,
        orientation: Option<&OrientationSample>,
    ) -> TiltEstimate {
        self.analyze(image, orientation)
            .unwrap_or_else(|e| e.to_estimate())
    }

    pub fn analyze_source(
        &self,
        source: &ImageSource,
        orientation: Option<&OrientationSample>,
    ) -> Result<TiltEstimate, AnalysisError> {
        self.run_source(source, orientation, None)
    }

    pub(crate) fn run_source(
        &self,
        source: &ImageSource,
        orientation: Option<&OrientationSample>,
        index: Option<usize>,
    ) -> Result<TiltEstimate, AnalysisError> {
        // Skip decoding when nothing could be measured anyway.
        self.extraction.backend().detector()?;
        let image = source.load()?;
        self.run(&image, orientation, index)
    }

    fn run(
        &self,
        image: &DynamicImage,
        orientation: Option<&OrientationSample>,
        index: Option<usize>,
    ) -> Result<TiltEstimate, AnalysisError> {
        let span = AnalysisSpan::new(index, None);
        let _enter = span.enter();

        let result = self.run_stages(image, orientation, &span);
        match &result {
            Ok(estimate) => span.record_result(estimate),
            Err(e) => span.record_failure(e),
        }
        result
    }

    fn run_stages(
        &self,
        image: &DynamicImage,
        orientation: Option<&OrientationSample>,
        span: &AnalysisSpan,
    ) -> Result<TiltEstimate, AnalysisError> {
        let segments = self.extraction.execute(image)?;
        span.record_extraction(image.width(), image.height(), segments.len());

        let classified = self.classifier.execute(&segments)?;
        span.record_classification(
            classified.buckets.vertical.len(),
            classified.buckets.horizontal.len(),
            classified.diagonal,
            classified.outliers,
        );

        let raw = self.estimator.execute(&classified)?;
        let estimate = self.compensator.execute(&(raw, orientation.copied()))?;
        span.record_compensation(estimate.camera_compensation);

        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FailureKind, LineSegment};
    use image::RgbImage;

    struct FixedDetector(Vec<LineSegment>);

    impl LineDetector for FixedDetector {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _image: &DynamicImage) -> Result<Vec<LineSegment>, AnalysisError> {
            Ok(self.0.clone())
        }
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(64, 48))
    }

    #[test]
    fn test_unavailable_backend_degrades() {
        let pipeline = TiltPipeline::builder(Config::default())
            .with_backend(LineBackend::Unavailable {
                reason: "no opencv".to_string(),
            })
            .build();

        let error = pipeline.analyze(&blank(), None).unwrap_err();
        assert_eq!(error.kind(), FailureKind::BackendUnavailable);

        let estimate = pipeline.analyze_or_degrade(&blank(), None);
        assert_eq!(estimate.confidence, 0.0);
        assert_eq!(estimate.corrected_vertical, 0.0);
        assert!(estimate.warning.unwrap().contains("no opencv"));
    }

    #[test]
    fn test_unavailable_backend_skips_decoding() {
        let pipeline = TiltPipeline::builder(Config::default())
            .with_backend(LineBackend::Unavailable {
                reason: "no opencv".to_string(),
            })
            .build();

        let error = pipeline
            .analyze_source(&ImageSource::Encoded(vec![1, 2, 3]), None)
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::BackendUnavailable);
    }

    #[test]
    fn test_no_segments_gives_fallback_confidence() {
        let pipeline = TiltPipeline::builder(Config::default())
            .with_detector(Arc::new(FixedDetector(Vec::new())))
            .build();

        let estimate = pipeline.analyze(&blank(), None).unwrap();
        assert_eq!(estimate.line_count, 0);
        assert_eq!(estimate.corrected_vertical, 0.0);
        assert!(estimate.confidence > 0.0 && estimate.confidence < 0.25);
    }

    #[test]
    fn test_empty_image_is_invalid() {
        let pipeline = TiltPipeline::builder(Config::default())
            .with_detector(Arc::new(FixedDetector(Vec::new())))
            .build();

        let error = pipeline
            .analyze(&DynamicImage::ImageRgb8(RgbImage::new(0, 0)), None)
            .unwrap_err();
        assert_eq!(error.kind(), FailureKind::InvalidImage);
    }
}
