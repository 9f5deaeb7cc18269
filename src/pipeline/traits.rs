use crate::pipeline::{AnalysisError, LineSegment};
use image::DynamicImage;

/// Extracts straight segments from a raster image
pub trait LineDetector: Send + Sync {
    /// Returns the name of the detector
    fn name(&self) -> &str;

    /// Detect candidate segments in pixel coordinates
    fn detect(&self, image: &DynamicImage) -> Result<Vec<LineSegment>, AnalysisError>;
}

/// Pipeline stage for composable tilt analysis
pub trait PipelineStage: Send + Sync {
    type Input;
    type Output;

    /// Execute this stage of the pipeline
    fn execute(&self, input: &Self::Input) -> Result<Self::Output, AnalysisError>;

    /// Get the name of this stage for logging/debugging
    fn stage_name(&self) -> &str;
}
