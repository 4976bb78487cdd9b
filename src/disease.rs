//! Disease classifier adapter: domain model output → (class, confidence).
//! No gating here, just the arg-max mapping and output validation.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::classifier::DynClassifier;
use crate::error::ClassifyError;
use crate::pixels::PixelImage;
use crate::ranking::argmax;

/// Fixed label set, in the model's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiseaseClass {
    EarlyBlight,
    LateBlight,
    Healthy,
}

impl DiseaseClass {
    pub const ALL: [DiseaseClass; 3] = [Self::EarlyBlight, Self::LateBlight, Self::Healthy];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EarlyBlight => "Early Blight",
            Self::LateBlight => "Late Blight",
            Self::Healthy => "Healthy",
        }
    }
}

impl fmt::Display for DiseaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DiseaseClass {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiseasePrediction {
    pub class: DiseaseClass,
    pub confidence: f32,
}

impl DiseasePrediction {
    /// Arg-max over a full output vector. Wrong length, empty, or non-finite
    /// outputs are inference failures, not low-confidence predictions.
    pub fn from_probabilities(model: &str, probs: &[f32]) -> Result<Self, ClassifyError> {
        if probs.len() != DiseaseClass::ALL.len() {
            return Err(ClassifyError::inference(
                model,
                format!(
                    "expected {} class probabilities, got {}",
                    DiseaseClass::ALL.len(),
                    probs.len()
                ),
            ));
        }
        if let Some(bad) = probs.iter().find(|p| !p.is_finite()) {
            return Err(ClassifyError::inference(
                model,
                format!("non-finite probability {bad} in output"),
            ));
        }
        let (idx, confidence) = argmax(probs)
            .ok_or_else(|| ClassifyError::inference(model, "empty output vector"))?;
        let class = DiseaseClass::from_index(idx)
            .ok_or_else(|| ClassifyError::inference(model, format!("class index {idx} out of range")))?;
        Ok(Self { class, confidence })
    }
}

pub struct DiseaseClassifier {
    model: DynClassifier,
}

impl DiseaseClassifier {
    pub fn new(model: DynClassifier) -> Self {
        Self { model }
    }

    pub fn classify(&self, image: &PixelImage) -> Result<DiseasePrediction, ClassifyError> {
        let probs = self.model.predict(image)?;
        DiseasePrediction::from_probabilities(self.model.name(), &probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_argmax() {
        let p = DiseasePrediction::from_probabilities("d", &[0.05, 0.9, 0.05]).unwrap();
        assert_eq!(p.class, DiseaseClass::LateBlight);
        assert!((p.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn tie_goes_to_first_class() {
        let p = DiseasePrediction::from_probabilities("d", &[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(p.class, DiseaseClass::EarlyBlight);
    }

    #[test]
    fn wrong_length_is_inference_error() {
        let err = DiseasePrediction::from_probabilities("d", &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, ClassifyError::Inference { .. }));
        assert!(DiseasePrediction::from_probabilities("d", &[]).is_err());
    }

    #[test]
    fn nan_is_inference_error() {
        assert!(DiseasePrediction::from_probabilities("d", &[f32::NAN, 0.5, 0.5]).is_err());
    }

    #[test]
    fn labels_serialize_as_display_text() {
        let v = serde_json::to_value(DiseaseClass::EarlyBlight).unwrap();
        assert_eq!(v, serde_json::json!("Early Blight"));
        assert_eq!(DiseaseClass::Healthy.to_string(), "Healthy");
        assert_eq!(DiseaseClass::from_index(3), None);
    }
}
