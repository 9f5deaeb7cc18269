use crate::algorithms::LineBackend;
use crate::analysis::{CameraCompensator, ClassifiedLines, LineClassifier, TiltEstimator};
use crate::orientation::OrientationSample;
use crate::pipeline::{AnalysisError, LineSegment, PipelineStage, TiltEstimate};
use crate::utils::validate_image_size;
use image::DynamicImage;

/// Stage that turns an image into candidate segments
pub struct LineExtractionStage {
    backend: LineBackend,
}

impl LineExtractionStage {
    pub fn new(backend: LineBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &LineBackend {
        &self.backend
    }
}

impl PipelineStage for LineExtractionStage {
    type Input = DynamicImage;
    type Output = Vec<LineSegment>;

    fn execute(&self, input: &Self::Input) -> Result<Self::Output, AnalysisError> {
        let detector = self.backend.detector()?;
        validate_image_size(input, 1)?;
        detector.detect(input)
    }

    fn stage_name(&self) -> &str {
        "LineExtraction"
    }
}

impl PipelineStage for LineClassifier {
    type Input = Vec<LineSegment>;
    type Output = ClassifiedLines;

    fn execute(&self, input: &Self::Input) -> Result<Self::Output, AnalysisError> {
        Ok(self.classify(input))
    }

    fn stage_name(&self) -> &str {
        "Classification"
    }
}

impl PipelineStage for TiltEstimator {
    type Input = ClassifiedLines;
    type Output = TiltEstimate;

    fn execute(&self, input: &Self::Input) -> Result<Self::Output, AnalysisError> {
        Ok(self.estimate(&input.buckets))
    }

    fn stage_name(&self) -> &str {
        "Estimation"
    }
}

impl PipelineStage for CameraCompensator {
    type Input = (TiltEstimate, Option<OrientationSample>);
    type Output = TiltEstimate;

    fn execute(&self, input: &Self::Input) -> Result<Self::Output, AnalysisError> {
        let (raw, sample) = input;
        Ok(self.compensate(raw, sample.as_ref()))
    }

    fn stage_name(&self) -> &str {
        "Compensation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FailureKind;
    use image::RgbImage;

    #[test]
    fn test_extraction_without_backend_fails_tagged() {
        let stage = LineExtractionStage::new(LineBackend::Unavailable {
            reason: "missing".to_string(),
        });
        let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));

        let error = stage.execute(&image).unwrap_err();
        assert_eq!(error.kind(), FailureKind::BackendUnavailable);
    }

    #[test]
    fn test_stage_chain() {
        let segments = vec![
            LineSegment::new(0.0, 0.0, 0.0, 100.0),
            LineSegment::new(0.0, 0.0, 100.0, 0.0),
        ];
        let classified = LineClassifier::default().execute(&segments).unwrap();
        let raw = TiltEstimator::default().execute(&classified).unwrap();
        let estimate = CameraCompensator::default().execute(&(raw, None)).unwrap();

        assert_eq!(estimate.line_count, 2);
        assert_eq!(estimate.corrected_vertical, 0.0);
        assert!(estimate.warning.is_some());
    }
}
