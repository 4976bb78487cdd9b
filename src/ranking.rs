//! Ranked decoding of probability vectors (top-K, arg-max, softmax).

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::ClassifyError;
use crate::labels::LabelVocabulary;

/// One `(label, probability)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLabel {
    pub label: String,
    pub probability: f32,
}

impl ScoredLabel {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability: sanitize(probability),
        }
    }
}

/// Predictions sorted by descending probability, already truncated to K.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedPrediction {
    entries: Vec<ScoredLabel>,
}

impl RankedPrediction {
    /// Decode a raw probability vector against `labels`, keeping the best `k`.
    /// Ties keep vocabulary order.
    pub fn decode(
        model: &str,
        probabilities: &[f32],
        labels: &LabelVocabulary,
        k: usize,
    ) -> Result<Self, ClassifyError> {
        if probabilities.len() != labels.len() {
            return Err(ClassifyError::inference(
                model,
                format!(
                    "output has {} classes but the label vocabulary has {}",
                    probabilities.len(),
                    labels.len()
                ),
            ));
        }
        let pairs = probabilities
            .iter()
            .zip(labels.iter())
            .map(|(&p, label)| ScoredLabel::new(label, p));
        Ok(Self::from_unsorted(pairs).truncated(k))
    }

    /// Build from arbitrary pairs; sorts (stable) but does not truncate.
    pub fn from_unsorted(pairs: impl IntoIterator<Item = ScoredLabel>) -> Self {
        let mut entries: Vec<ScoredLabel> = pairs.into_iter().collect();
        entries.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });
        Self { entries }
    }

    pub fn truncated(mut self, k: usize) -> Self {
        self.entries.truncate(k);
        self
    }

    /// First `n` entries (or fewer).
    pub fn top(&self, n: usize) -> &[ScoredLabel] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredLabel> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same ranking with every label rewritten by `f`.
    pub fn map_labels(self, f: impl Fn(&str) -> String) -> Self {
        let entries = self
            .entries
            .into_iter()
            .map(|e| ScoredLabel {
                label: f(&e.label),
                probability: e.probability,
            })
            .collect();
        Self { entries }
    }
}

/// Index and value of the largest entry; ties resolve to the lowest index.
/// `None` for an empty vector.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

// non-finite → 0.0
fn sanitize(p: f32) -> f32 {
    if p.is_finite() {
        p
    } else {
        0.0
    }
}
