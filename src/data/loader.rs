use crate::pipeline::AnalysisError;
use image::DynamicImage;
use std::borrow::Cow;
use std::path::PathBuf;

/// A photograph in any of the forms a caller may hold it
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Encoded(Vec<u8>),
    Decoded(DynamicImage),
}

impl ImageSource {
    /// Decode the image if needed. Already-decoded images are borrowed.
    pub fn load(&self) -> Result<Cow<'_, DynamicImage>, AnalysisError> {
        match self {
            ImageSource::Path(path) => Ok(Cow::Owned(image::open(path)?)),
            ImageSource::Encoded(bytes) => {
                if bytes.is_empty() {
                    return Err(AnalysisError::InvalidImage {
                        reason: "empty image buffer".to_string(),
                    });
                }
                Ok(Cow::Owned(image::load_from_memory(bytes)?))
            }
            ImageSource::Decoded(image) => Ok(Cow::Borrowed(image)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Encoded(bytes) => format!("<{} encoded bytes>", bytes.len()),
            ImageSource::Decoded(image) => format!("<{}x{} raster>", image.width(), image.height()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Encoded(bytes)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        ImageSource::Decoded(image)
    }
}
