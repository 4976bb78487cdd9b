//! # Decision Pipeline
//! Sequences relevance scoring → relevance gate → disease classification →
//! confidence gate, producing exactly one [`Outcome`] per request.
//!
//! ```text
//! Start ─score─▶ Scored ─(score < PLANT_THRESHOLD)──────────▶ RejectedNotPlant
//!                  │
//!                  └─classify─▶ Classified ─(conf < CONF_THRESHOLD)─▶ RejectedLowConfidence
//!                                   │
//!                                   └────────────────────────────────▶ Accepted
//! ```
//!
//! Both gates reject on strict less-than; a value equal to its threshold passes.
//! The disease model is never invoked for a not-a-plant image. Any inference
//! failure aborts the request with an error, never a rejection.

use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::GateConfig;
use crate::decision::Outcome;
use crate::disease::{DiseaseClassifier, DiseasePrediction};
use crate::error::ClassifyError;
use crate::metrics;
use crate::pixels::PixelImage;
use crate::ranking::RankedPrediction;
use crate::relevance::{RelevanceReport, RelevanceScorer};

pub const DEFAULT_DIAGNOSTIC_TOP_N: usize = 10;

/// True when `value` clears `threshold` (ties pass).
pub fn passes_gate(value: f32, threshold: f32) -> bool {
    value >= threshold
}

/// Pure gate logic. `run_disease` is called at most once, and only when the
/// relevance gate passes.
pub fn decide<F>(
    relevance: &RelevanceReport,
    gate: &GateConfig,
    diagnostic_top_n: usize,
    run_disease: F,
) -> Result<Outcome, ClassifyError>
where
    F: FnOnce() -> Result<DiseasePrediction, ClassifyError>,
{
    let plant_score = relevance.score;

    // Scored
    if !passes_gate(plant_score, gate.plant_threshold()) {
        let diagnostics = (diagnostic_top_n > 0).then(|| {
            RankedPrediction::from_unsorted(
                relevance.ranked.top(diagnostic_top_n).iter().cloned(),
            )
        });
        return Ok(Outcome::not_a_plant(plant_score, diagnostics));
    }

    // Classified
    let prediction = run_disease()?;
    if !passes_gate(prediction.confidence, gate.conf_threshold()) {
        return Ok(Outcome::low_confidence(plant_score, prediction.confidence));
    }

    Ok(Outcome::accepted(
        prediction.class,
        prediction.confidence,
        plant_score,
    ))
}

/// The two classifiers plus the immutable gate configuration. Shared
/// read-only across requests.
pub struct DecisionPipeline {
    scorer: RelevanceScorer,
    disease: DiseaseClassifier,
    gate: GateConfig,
    diagnostic_top_n: usize,
}

impl DecisionPipeline {
    pub fn new(scorer: RelevanceScorer, disease: DiseaseClassifier, gate: GateConfig) -> Self {
        Self {
            scorer,
            disease,
            gate,
            diagnostic_top_n: DEFAULT_DIAGNOSTIC_TOP_N,
        }
    }

    /// How many ranked predictions to echo on a not-a-plant rejection (0 = none).
    pub fn with_diagnostics(mut self, top_n: usize) -> Self {
        self.diagnostic_top_n = top_n;
        self
    }

    pub fn gate(&self) -> &GateConfig {
        &self.gate
    }

    /// Run the pipeline on an already-decoded image.
    pub fn classify(&self, image: &PixelImage) -> Result<Outcome, ClassifyError> {
        let relevance = self.scorer.score(image)?;
        decide(&relevance, &self.gate, self.diagnostic_top_n, || {
            self.disease.classify(image)
        })
    }

    /// Decode + classify, with logging and metrics. The upload itself is never
    /// logged, only a short digest of it.
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<Outcome, ClassifyError> {
        let started = Instant::now();
        let id = anon_hash(bytes);

        let result = PixelImage::decode(bytes).and_then(|image| self.classify(&image));
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::record_duration(elapsed_ms);

        match &result {
            Ok(outcome) => {
                metrics::record_outcome(outcome);
                info!(
                    target: "pipeline",
                    %id,
                    outcome = outcome.kind(),
                    plant_score = outcome.plant_score(),
                    plant_threshold = self.gate.plant_threshold(),
                    disease_confidence = ?outcome.disease_confidence(),
                    conf_threshold = self.gate.conf_threshold(),
                    elapsed_ms,
                    "classified"
                );
            }
            Err(e) => {
                metrics::record_error(e);
                warn!(target: "pipeline", %id, kind = e.kind(), error = %e, elapsed_ms, "classification failed");
            }
        }
        result
    }
}

/// First 6 bytes of SHA-256, hex.
pub(crate) fn anon_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
