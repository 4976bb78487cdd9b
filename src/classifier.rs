//! Model seam: anything that maps a [`PixelImage`] to a probability vector.
//!
//! Implementations must be safe to call concurrently through `&self`. A
//! runtime whose inference needs exclusive access (e.g. ONNX sessions) keeps its
//! own lock, one per model, so the two classifiers never contend.

use std::sync::Arc;

use crate::error::ClassifyError;
use crate::pixels::PixelImage;

pub trait ImageClassifier: Send + Sync {
    /// Full class-probability vector in the model's vocabulary order.
    /// Resizing/normalisation is the implementation's business.
    fn predict(&self, image: &PixelImage) -> Result<Vec<f32>, ClassifyError>;

    /// Short model name for logs and error messages.
    fn name(&self) -> &str;
}

/// Convenient alias used by the pipeline and bootstrap.
pub type DynClassifier = Arc<dyn ImageClassifier>;
