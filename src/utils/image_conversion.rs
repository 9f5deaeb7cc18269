use crate::pipeline::AnalysisError;
use image::DynamicImage;

/// Reject rasters the line extractor cannot work on.
pub fn validate_image_size(image: &DynamicImage, min_size: u32) -> Result<(), AnalysisError> {
    let (width, height) = (image.width(), image.height());

    if width < min_size || height < min_size {
        return Err(AnalysisError::InvalidImage {
            reason: format!(
                "image too small: {}x{}, minimum: {}x{}",
                width, height, min_size, min_size
            ),
        });
    }

    Ok(())
}

#[cfg(feature = "opencv")]
pub use self::mat::*;

#[cfg(feature = "opencv")]
mod mat {
    use crate::pipeline::AnalysisError;
    use image::DynamicImage;
    use opencv::core::{Mat, Scalar, CV_8UC3, CV_8UC4};
    use opencv::imgproc;
    use opencv::prelude::*;

    /// Copy an RGB or RGBA raster into an OpenCV matrix.
    ///
    /// Returns the matrix together with the `cvt_color` code that turns it
    /// into grayscale.
    pub fn image_to_mat(image: &DynamicImage) -> Result<(Mat, i32), AnalysisError> {
        let rows = image.height() as i32;
        let cols = image.width() as i32;

        let (raw, mat_type, to_gray) = if image.color().has_alpha() {
            (image.to_rgba8().into_raw(), CV_8UC4, imgproc::COLOR_RGBA2GRAY)
        } else {
            (image.to_rgb8().into_raw(), CV_8UC3, imgproc::COLOR_RGB2GRAY)
        };

        let mut mat = Mat::new_rows_cols_with_default(rows, cols, mat_type, Scalar::all(0.0))?;
        let data = mat.data_bytes_mut()?;
        if data.len() != raw.len() {
            return Err(AnalysisError::InvalidImage {
                reason: format!(
                    "pixel buffer size mismatch: expected {} bytes, got {}",
                    data.len(),
                    raw.len()
                ),
            });
        }
        data.copy_from_slice(&raw);

        Ok((mat, to_gray))
    }
}
