//! decision.rs — terminal outcome of one classification request.
//!
//! Exactly one `Outcome` is built per request. Rejections are successful
//! verdicts ("the system worked and says no"); failures live in
//! [`crate::error::ClassifyError`] instead.

use serde::Serialize;

use crate::disease::DiseaseClass;
use crate::ranking::RankedPrediction;

/// Why a request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotAPlant,
    LowConfidence,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotAPlant => "not_a_plant",
            Self::LowConfidence => "low_confidence",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: RejectReason,
    pub plant_score: f32,
    /// Only set once the disease model actually ran.
    pub disease_confidence: Option<f32>,
    /// Human-readable explanation shown to the uploader.
    pub message: String,
    /// Top of the general classifier's ranking, for not-a-plant diagnostics.
    pub diagnostics: Option<RankedPrediction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rejected(Rejection),
    Accepted {
        class: DiseaseClass,
        confidence: f32,
        plant_score: f32,
    },
}

impl Outcome {
    pub fn not_a_plant(plant_score: f32, diagnostics: Option<RankedPrediction>) -> Self {
        Self::Rejected(Rejection {
            reason: RejectReason::NotAPlant,
            plant_score,
            disease_confidence: None,
            message: not_a_plant_message(plant_score),
            diagnostics,
        })
    }

    pub fn low_confidence(plant_score: f32, confidence: f32) -> Self {
        Self::Rejected(Rejection {
            reason: RejectReason::LowConfidence,
            plant_score,
            disease_confidence: Some(confidence),
            message: low_confidence_message(confidence),
            diagnostics: None,
        })
    }

    pub fn accepted(class: DiseaseClass, confidence: f32, plant_score: f32) -> Self {
        Self::Accepted {
            class,
            confidence,
            plant_score,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Rejected(r) => Some(r.reason),
            Self::Accepted { .. } => None,
        }
    }

    /// `accepted` | `not_a_plant` | `low_confidence` (logs, metric labels).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(r) => r.reason.as_str(),
            Self::Accepted { .. } => "accepted",
        }
    }

    pub fn plant_score(&self) -> f32 {
        match self {
            Self::Rejected(r) => r.plant_score,
            Self::Accepted { plant_score, .. } => *plant_score,
        }
    }

    /// Disease confidence, when the disease model ran.
    pub fn disease_confidence(&self) -> Option<f32> {
        match self {
            Self::Rejected(r) => r.disease_confidence,
            Self::Accepted { confidence, .. } => Some(*confidence),
        }
    }
}

pub fn not_a_plant_message(plant_score: f32) -> String {
    format!(
        "Invalid image. Please upload a plant/leaf image (potato leaf preferred). \
         Plant confidence: {:.2}%.",
        plant_score * 100.0
    )
}

pub fn low_confidence_message(confidence: f32) -> String {
    format!(
        "Low confidence ({:.2}%). Please upload a clear potato leaf image \
         (good lighting, leaf in focus).",
        confidence * 100.0
    )
}
