// src/relevance.rs
//! Relevance gate primitives: keyword table (TOML), label normalisation,
//! top-K probability aggregation and the scorer that wraps the general-purpose
//! classifier.
//!
//! The general classifier was never trained to answer "is this a plant?". Its
//! taxonomy spreads plant evidence across many fine-grained labels (cultivars,
//! fruit parts, fungi), so the score is the *sum* of probabilities of every
//! top-K label that mentions a plant keyword, not the max of any single one.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::classifier::DynClassifier;
use crate::error::ClassifyError;
use crate::labels::LabelVocabulary;
use crate::pixels::PixelImage;
use crate::ranking::RankedPrediction;

pub const DEFAULT_TOP_K: usize = 50;

/// Plant / plant-product terms, matched against normalised labels.
pub const DEFAULT_PLANT_KEYWORDS: &[&str] = &[
    "plant", "leaf", "tree", "flower", "fruit", "vegetable", "mushroom", "corn", "cabbage",
    "broccoli", "lettuce", "spinach", "artichoke", "banana", "strawberry", "orange", "lemon",
    "pineapple", "pomegranate", "fig", "jackfruit", "grape", "acorn", "hay", "rapeseed", "wheat",
    "buckwheat", "moss", "fungus", "lichen", "herb",
];

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Keyword anywhere inside the label ("fig" also hits "configuration").
    #[default]
    Substring,
    /// Keyword must be a whole word of the label.
    Word,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRoot {
    pub relevance: KeywordSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordSection {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub match_mode: MatchMode,
    pub keywords: Vec<String>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/* ----------------------------
Compiled keyword table
---------------------------- */

#[derive(Debug, Clone)]
pub struct KeywordTable {
    keywords: Vec<String>,
    mode: MatchMode,
    top_k: usize,
    word_re: Option<Regex>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordTable {
    pub fn builtin() -> Self {
        let set: BTreeSet<String> = DEFAULT_PLANT_KEYWORDS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            keywords: set.into_iter().collect(),
            mode: MatchMode::Substring,
            top_k: DEFAULT_TOP_K,
            word_re: None,
        }
    }

    /// Keywords are trimmed, lowercased and de-duplicated; blanks are dropped.
    pub fn new(
        keywords: impl IntoIterator<Item = String>,
        mode: MatchMode,
        top_k: usize,
    ) -> anyhow::Result<Self> {
        let set: BTreeSet<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if set.is_empty() {
            anyhow::bail!("keyword table is empty");
        }
        if top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        let keywords: Vec<String> = set.into_iter().collect();

        let word_re = match mode {
            MatchMode::Substring => None,
            MatchMode::Word => {
                let alts = keywords
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                let re = Regex::new(&format!(r"\b(?:{alts})\b"))
                    .map_err(|e| anyhow::anyhow!("keyword regex error: {e}"))?;
                Some(re)
            }
        };

        Ok(Self {
            keywords,
            mode,
            top_k,
            word_re,
        })
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let root: KeywordRoot = toml::from_str(toml_str)?;
        let s = root.relevance;
        Self::new(s.keywords, s.match_mode, s.top_k)
    }

    /// Load from `path`; a missing file falls back to the built-in table,
    /// a present-but-broken file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                target: "relevance",
                path = %path.display(),
                "keyword table not found, using built-in plant keywords"
            );
            return Ok(Self::builtin());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read keyword table at {}: {}", path.display(), e)
        })?;
        let table = Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid keyword table {}: {}", path.display(), e))?;
        info!(
            target: "relevance",
            path = %path.display(),
            keywords = table.keywords.len(),
            mode = ?table.mode,
            top_k = table.top_k,
            "keyword table loaded"
        );
        Ok(table)
    }

    /// Does an already-normalised label mention any keyword?
    pub fn matches(&self, label: &str) -> bool {
        match &self.word_re {
            Some(re) => re.is_match(label),
            None => self.keywords.iter().any(|k| label.contains(k.as_str())),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

/// Lowercase, underscores → spaces (`Granny_Smith` → `granny smith`).
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase().replace('_', " ")
}

/// Sum of probabilities of every ranked label matching the table, clamped to
/// [0,1]. Labels are expected to be normalised already.
pub fn aggregate(ranked: &RankedPrediction, table: &KeywordTable) -> f32 {
    let sum: f32 = ranked
        .iter()
        .filter(|e| table.matches(&e.label))
        .map(|e| e.probability)
        .sum();
    clamp_score(sum)
}

// NaN and -0.0 both come out as 0.0
fn clamp_score(x: f32) -> f32 {
    if x.is_nan() || x <= 0.0 {
        0.0
    } else {
        x.min(1.0)
    }
}

/// Result of relevance evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceReport {
    /// Aggregated plant likelihood in [0,1].
    pub score: f32,
    /// Cleaned top-K ranking (normalised labels), kept for diagnostics.
    pub ranked: RankedPrediction,
    /// Labels that contributed to `score`.
    pub matched: Vec<String>,
}

impl RelevanceReport {
    pub fn from_ranked(ranked: RankedPrediction, table: &KeywordTable) -> Self {
        let score = aggregate(&ranked, table);
        let matched = ranked
            .iter()
            .filter(|e| table.matches(&e.label))
            .map(|e| e.label.clone())
            .collect();
        Self {
            score,
            ranked,
            matched,
        }
    }
}

/// Wraps the general-purpose classifier and turns its output into a plant score.
pub struct RelevanceScorer {
    classifier: DynClassifier,
    labels: LabelVocabulary,
    keywords: KeywordTable,
}

impl RelevanceScorer {
    pub fn new(classifier: DynClassifier, labels: LabelVocabulary, keywords: KeywordTable) -> Self {
        Self {
            classifier,
            labels,
            keywords,
        }
    }

    /// Run the classifier, decode top-K, normalise labels, aggregate.
    pub fn score(&self, image: &PixelImage) -> Result<RelevanceReport, ClassifyError> {
        let probs = self.classifier.predict(image)?;
        let ranked = RankedPrediction::decode(
            self.classifier.name(),
            &probs,
            &self.labels,
            self.keywords.top_k,
        )?
        .map_labels(normalize_label);

        let report = RelevanceReport::from_ranked(ranked, &self.keywords);
        debug!(
            target: "relevance",
            score = report.score,
            matched = ?truncate_vec(&report.matched, 5),
            "relevance scored"
        );
        Ok(report)
    }
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/* ----------------------------
Tests
---------------------------- */
