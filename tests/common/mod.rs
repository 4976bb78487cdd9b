// tests/common/mod.rs
//
// Shared fixtures: scripted classifiers with call counters, a small label
// vocabulary, and in-memory test images.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use leaf_disease_gate::classifier::{DynClassifier, ImageClassifier};
use leaf_disease_gate::config::GateConfig;
use leaf_disease_gate::disease::DiseaseClassifier;
use leaf_disease_gate::engine::DecisionPipeline;
use leaf_disease_gate::labels::LabelVocabulary;
use leaf_disease_gate::relevance::{KeywordTable, RelevanceScorer};
use leaf_disease_gate::{ClassifyError, PixelImage};

/// Number of labels in the fake general-classifier vocabulary.
pub const VOCAB_SIZE: usize = 60;

/// Always returns the same vector (or the same failure) and counts calls.
pub struct ScriptedClassifier {
    name: &'static str,
    output: Result<Vec<f32>, String>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn returning(name: &'static str, probs: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Ok(probs),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str, reason: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            output: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for ScriptedClassifier {
    fn predict(&self, _image: &PixelImage) -> Result<Vec<f32>, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output
            .clone()
            .map_err(|reason| ClassifyError::inference(self.name, reason))
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// `leaf`, `car`, `Granny_Smith`, `banana`, then neutral `object_N` fillers.
pub fn vocabulary() -> LabelVocabulary {
    let mut labels = vec![
        "leaf".to_string(),
        "car".to_string(),
        "Granny_Smith".to_string(),
        "banana".to_string(),
    ];
    labels.extend((labels.len()..VOCAB_SIZE).map(|i| format!("object_{i}")));
    LabelVocabulary::new(labels)
}

/// Probability vector over `vocabulary()`; unnamed labels get 0.0.
pub fn general_output(pairs: &[(&str, f32)]) -> Vec<f32> {
    let vocab = vocabulary();
    let mut out = vec![0.0; vocab.len()];
    for (label, p) in pairs {
        let idx = vocab
            .iter()
            .position(|l| l == *label)
            .unwrap_or_else(|| panic!("label {label} not in test vocabulary"));
        out[idx] = *p;
    }
    out
}

pub fn pipeline(
    general: &Arc<ScriptedClassifier>,
    disease: &Arc<ScriptedClassifier>,
    gate: GateConfig,
) -> DecisionPipeline {
    let general: DynClassifier = general.clone();
    let disease: DynClassifier = disease.clone();
    let scorer = RelevanceScorer::new(general, vocabulary(), KeywordTable::builtin());
    DecisionPipeline::new(scorer, DiseaseClassifier::new(disease), gate)
}

pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(32, 24, Rgb([40, 160, 60]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn leaf_image() -> PixelImage {
    PixelImage::decode(&png_bytes()).expect("decode fixture")
}
