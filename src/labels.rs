//! Label vocabulary for the general-purpose classifier.
//!
//! Two on-disk formats are accepted:
//! - Keras class index JSON: `{"0": ["n01440764", "tench"], "1": [...], ...}`
//! - plain text, one label per line (blank lines skipped)

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
}

impl LabelVocabulary {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Load by extension: `.json` → class index, anything else → text lines.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read label vocabulary at {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let vocab = if is_json {
            Self::from_class_index_json(&data)?
        } else {
            Self::from_lines(&data)
        };
        if vocab.is_empty() {
            anyhow::bail!("label vocabulary at {} is empty", path.display());
        }
        Ok(vocab)
    }

    pub fn from_class_index_json(data: &str) -> anyhow::Result<Self> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(data).context("class index JSON must map index -> [wnid, label]")?;

        let mut indexed = BTreeMap::new();
        for (k, v) in raw {
            let idx: usize = k
                .trim()
                .parse()
                .with_context(|| format!("class index key `{k}` is not an integer"))?;
            let label = v
                .last()
                .cloned()
                .with_context(|| format!("class index entry {idx} has no label"))?;
            indexed.insert(idx, label);
        }

        // indices must be exactly 0..n
        for (expected, idx) in indexed.keys().enumerate() {
            if *idx != expected {
                anyhow::bail!("class index is not contiguous: missing entry {expected}");
            }
        }
        Ok(Self::new(indexed.into_values().collect()))
    }

    pub fn from_lines(data: &str) -> Self {
        Self::new(
            data.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
