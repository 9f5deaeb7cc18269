use crate::config::ExtractionConfig;
use crate::pipeline::{AnalysisError, LineDetector, LineSegment};
use crate::utils::image_to_mat;
use image::DynamicImage;
use opencv::core::{Mat, Size, Vec4i, Vector};
use opencv::imgproc;
use std::f64::consts::PI;

/// Canny edges followed by the probabilistic Hough transform
pub struct OpenCVLineDetector {
    config: ExtractionConfig,
    version: String,
}

impl OpenCVLineDetector {
    pub fn new() -> crate::Result<Self> {
        Self::with_config(ExtractionConfig::default())
    }

    /// Fails when the native OpenCV library cannot be reached.
    pub fn with_config(config: ExtractionConfig) -> crate::Result<Self> {
        let version = opencv::core::get_version_string()?;
        tracing::debug!(opencv_version = %version, "OpenCV line detector initialized");
        Ok(Self { config, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn edges(&self, image: &DynamicImage) -> Result<Mat, AnalysisError> {
        let (color, to_gray) = image_to_mat(image)?;

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&color, &mut gray, to_gray)?;

        let kernel = self.config.blur_kernel_size as i32;
        let mut blurred = Mat::default();
        imgproc::gaussian_blur_def(&gray, &mut blurred, Size::new(kernel, kernel), 0.0)?;

        let mut edges = Mat::default();
        imgproc::canny_def(&blurred, &mut edges, self.config.canny_low, self.config.canny_high)?;
        Ok(edges)
    }
}

impl LineDetector for OpenCVLineDetector {
    fn name(&self) -> &str {
        "OpenCV-HoughP"
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<LineSegment>, AnalysisError> {
        let edges = self.edges(image)?;

        let mut lines = Vector::<Vec4i>::new();
        imgproc::hough_lines_p(
            &edges,
            &mut lines,
            self.config.rho_px,
            self.config.theta_degrees * PI / 180.0,
            self.config.hough_threshold,
            self.config.min_line_length(image.width()),
            self.config.max_line_gap_px,
        )?;

        let segments: Vec<LineSegment> = lines
            .iter()
            .map(|l| LineSegment::new(l[0] as f64, l[1] as f64, l[2] as f64, l[3] as f64))
            .collect();

        tracing::trace!(
            detector = self.name(),
            segments = segments.len(),
            width = image.width(),
            height = image.height(),
            "Hough segments extracted"
        );

        Ok(segments)
    }
}
