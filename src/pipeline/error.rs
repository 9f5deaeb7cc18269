use crate::pipeline::TiltEstimate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single image could not be analyzed
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("line detection unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("line extraction failed: {reason}")]
    Extraction { reason: String },
}

/// Stable tag for an [`AnalysisError`], suitable for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    BackendUnavailable,
    Decode,
    InvalidImage,
    Extraction,
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::BackendUnavailable { .. } => FailureKind::BackendUnavailable,
            AnalysisError::Decode(_) => FailureKind::Decode,
            AnalysisError::InvalidImage { .. } => FailureKind::InvalidImage,
            AnalysisError::Extraction { .. } => FailureKind::Extraction,
        }
    }

    /// Degrade into a zero-tilt, zero-confidence estimate naming the failure.
    pub fn to_estimate(&self) -> TiltEstimate {
        TiltEstimate::degraded(self.to_string())
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for AnalysisError {
    fn from(error: opencv::Error) -> Self {
        AnalysisError::Extraction {
            reason: error.to_string(),
        }
    }
}
