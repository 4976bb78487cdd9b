//! ONNX Runtime backed [`ImageClassifier`] (behind the `onnx` feature).

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;
use tracing::info;

use crate::classifier::ImageClassifier;
use crate::error::ClassifyError;
use crate::pixels::PixelImage;
use crate::preprocess::{to_tensor, ModelSpec};
use crate::ranking::softmax;

/// One loaded model. `Session::run` needs `&mut self`, so each model keeps
/// its own lock; the relevance and disease models never wait on each other.
pub struct OnnxClassifier {
    spec: ModelSpec,
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, spec: ModelSpec) -> anyhow::Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("model `{}` not found at {}", spec.name, model_path.display());
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| anyhow::anyhow!("{}: session builder: {e}", spec.name))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| anyhow::anyhow!("{}: intra threads: {e}", spec.name))?
            .commit_from_file(model_path)
            .map_err(|e: ort::Error| anyhow::anyhow!("{}: ONNX load failed: {e}", spec.name))?;

        info!(
            model = %spec.name,
            path = %model_path.display(),
            input_size = spec.input_size,
            layout = ?spec.layout,
            scaling = ?spec.scaling,
            "ONNX model loaded"
        );

        Ok(Self {
            spec,
            session: Mutex::new(session),
        })
    }

    fn fail(&self, reason: impl Into<String>) -> ClassifyError {
        ClassifyError::inference(self.spec.name.clone(), reason)
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, image: &PixelImage) -> Result<Vec<f32>, ClassifyError> {
        let input = to_tensor(image, &self.spec);
        let tensor = TensorRef::from_array_view(&input)
            .map_err(|e| self.fail(format!("input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| self.fail("session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| self.fail(format!("ONNX inference failed: {e}")))?;

        // Output shape: [1, num_classes]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| self.fail(format!("output extraction: {e}")))?;

        if shape.len() != 2 || shape[0] != 1 {
            return Err(self.fail(format!(
                "unexpected output shape {shape:?}, expected [1, classes]"
            )));
        }

        let probs = data.to_vec();
        Ok(if self.spec.softmax {
            softmax(&probs)
        } else {
            probs
        })
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}
