use axum::{routing::get, Router};
use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::GateConfig;
use crate::decision::Outcome;
use crate::error::ClassifyError;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the (static) gate thresholds.
    /// Call once per process; a second recorder cannot be installed.
    pub fn init(gate: &GateConfig) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        gauge!("leaf_gate_threshold", "gate" => "plant").set(gate.plant_threshold() as f64);
        gauge!("leaf_gate_threshold", "gate" => "confidence").set(gate.conf_threshold() as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

// Without an installed recorder these are no-ops (tests, metrics disabled).

pub(crate) fn record_outcome(outcome: &Outcome) {
    counter!("leaf_classify_outcomes_total", "outcome" => outcome.kind()).increment(1);
}

pub(crate) fn record_error(err: &ClassifyError) {
    let kind = match err {
        ClassifyError::Decode(_) => "decode",
        ClassifyError::Inference { .. } => "inference",
    };
    counter!("leaf_classify_errors_total", "kind" => kind).increment(1);
}

pub(crate) fn record_duration(ms: f64) {
    histogram!("leaf_classify_duration_ms").record(ms);
}
