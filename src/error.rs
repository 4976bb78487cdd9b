//! Failure taxonomy for the classification pipeline.
//!
//! Gate rejections are *not* errors; they travel as [`crate::decision::Outcome`].
//! Everything here means the system could not produce a verdict at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Upload bytes are not a decodable image (client input problem).
    #[error("could not decode image: {0}")]
    Decode(String),

    /// A model invocation failed or returned something unusable.
    #[error("{model} inference failed: {reason}")]
    Inference { model: String, reason: String },
}

impl ClassifyError {
    pub fn inference(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Inference {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable kind used in error bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::Inference { .. } => "inference_error",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<image::ImageError> for ClassifyError {
    fn from(e: image::ImageError) -> Self {
        Self::Decode(e.to_string())
    }
}
