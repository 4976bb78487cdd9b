// src/bootstrap.rs
//! Process-start wiring: read configuration once, load both models, and build
//! the shared pipeline. Nothing here runs per request.

use std::sync::Arc;

use tracing::info;

use crate::classifier::DynClassifier;
use crate::config::{GateConfig, ServiceConfig};
use crate::disease::DiseaseClassifier;
use crate::engine::DecisionPipeline;
use crate::labels::LabelVocabulary;
use crate::relevance::{KeywordTable, RelevanceScorer};

pub struct Runtime {
    pub gate: GateConfig,
    pub service: ServiceConfig,
    pub pipeline: Arc<DecisionPipeline>,
}

impl Runtime {
    /// Read all configuration from the environment and load the models.
    /// Any invalid setting or missing artifact aborts startup.
    pub fn from_env() -> anyhow::Result<Self> {
        let gate = GateConfig::from_env()?;
        let service = ServiceConfig::from_env()?;
        let (plant_model, disease_model) = load_models(&service)?;
        Self::assemble(gate, service, plant_model, disease_model)
    }

    /// Build from already-loaded classifiers (custom runtimes, tests).
    pub fn assemble(
        gate: GateConfig,
        service: ServiceConfig,
        plant_model: DynClassifier,
        disease_model: DynClassifier,
    ) -> anyhow::Result<Self> {
        let keywords = KeywordTable::load(&service.keywords_path)?;
        let labels = LabelVocabulary::load_from_file(&service.plant_labels_path)?;

        info!(
            plant_threshold = gate.plant_threshold(),
            conf_threshold = gate.conf_threshold(),
            labels = labels.len(),
            keywords = keywords.keywords().len(),
            top_k = keywords.top_k(),
            plant_model = plant_model.name(),
            disease_model = disease_model.name(),
            "pipeline configured"
        );

        let scorer = RelevanceScorer::new(plant_model, labels, keywords);
        let disease = DiseaseClassifier::new(disease_model);
        let pipeline = DecisionPipeline::new(scorer, disease, gate)
            .with_diagnostics(service.diagnostic_top_n);

        Ok(Self {
            gate,
            service,
            pipeline: Arc::new(pipeline),
        })
    }
}

#[cfg(feature = "onnx")]
fn load_models(service: &ServiceConfig) -> anyhow::Result<(DynClassifier, DynClassifier)> {
    use crate::onnx::OnnxClassifier;
    use crate::preprocess::ModelSpec;

    let plant = OnnxClassifier::load(&service.plant_model_path, ModelSpec::mobilenet_v2())?;
    let disease = OnnxClassifier::load(
        &service.disease_model_path,
        ModelSpec::potato_disease(service.disease_input_size),
    )?;
    Ok((Arc::new(plant), Arc::new(disease)))
}

#[cfg(not(feature = "onnx"))]
fn load_models(_service: &ServiceConfig) -> anyhow::Result<(DynClassifier, DynClassifier)> {
    anyhow::bail!("no model runtime compiled in; rebuild with `--features onnx`")
}
