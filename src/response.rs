//! Response encoder: one stable JSON shape for all three outcomes, so callers
//! can branch on `accepted` alone.

use serde::Serialize;

use crate::decision::Outcome;
use crate::disease::DiseaseClass;
use crate::ranking::ScoredLabel;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyResponse {
    pub accepted: bool,
    /// Only set when accepted.
    pub class: Option<DiseaseClass>,
    /// `null` when the disease model never ran.
    pub confidence: Option<f32>,
    pub plant_confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Not-a-plant diagnostics (general classifier's best guesses).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_predictions: Option<Vec<ScoredLabel>>,
}

impl From<&Outcome> for ClassifyResponse {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Rejected(r) => Self {
                accepted: false,
                class: None,
                confidence: r.disease_confidence,
                plant_confidence: r.plant_score,
                message: Some(r.message.clone()),
                top_predictions: r
                    .diagnostics
                    .as_ref()
                    .map(|d| d.iter().cloned().collect()),
            },
            Outcome::Accepted {
                class,
                confidence,
                plant_score,
            } => Self {
                accepted: true,
                class: Some(*class),
                confidence: Some(*confidence),
                plant_confidence: *plant_score,
                message: None,
                top_predictions: None,
            },
        }
    }
}
