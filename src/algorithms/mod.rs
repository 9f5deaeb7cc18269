// Line detection backends
#[cfg(feature = "opencv")]
pub mod opencv_lines;

#[cfg(feature = "opencv")]
pub use opencv_lines::*;

use crate::config::ExtractionConfig;
use crate::pipeline::{AnalysisError, LineDetector};
use std::fmt;
use std::sync::Arc;

/// Whether line extraction can run, decided once at pipeline construction
#[derive(Clone)]
pub enum LineBackend {
    Available(Arc<dyn LineDetector>),
    Unavailable { reason: String },
}

impl LineBackend {
    /// Initialize the default detector for this build.
    pub fn probe(config: &ExtractionConfig) -> Self {
        #[cfg(feature = "opencv")]
        {
            match OpenCVLineDetector::with_config(config.clone()) {
                Ok(detector) => LineBackend::Available(Arc::new(detector)),
                Err(e) => {
                    tracing::warn!("OpenCV line detector failed to initialize: {}", e);
                    LineBackend::Unavailable {
                        reason: e.to_string(),
                    }
                }
            }
        }

        #[cfg(not(feature = "opencv"))]
        {
            let _ = config;
            LineBackend::Unavailable {
                reason: "built without the opencv feature".to_string(),
            }
        }
    }

    pub fn from_detector(detector: Arc<dyn LineDetector>) -> Self {
        LineBackend::Available(detector)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LineBackend::Available(_))
    }

    pub fn detector(&self) -> Result<&Arc<dyn LineDetector>, AnalysisError> {
        match self {
            LineBackend::Available(detector) => Ok(detector),
            LineBackend::Unavailable { reason } => Err(AnalysisError::BackendUnavailable {
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Debug for LineBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineBackend::Available(detector) => {
                f.debug_tuple("Available").field(&detector.name()).finish()
            }
            LineBackend::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}
