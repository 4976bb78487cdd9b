//! Leaf disease gate — binary entrypoint.
//! Loads configuration and both models once, then serves the Axum router.

use leaf_disease_gate::{api, bootstrap::Runtime, metrics::Metrics, AppState};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs filtered by `LEAF_LOG`, then `RUST_LOG`. The hosting runtime may
/// already have installed a subscriber; in that case ours is skipped.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("LEAF_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            EnvFilter::new("leaf_disease_gate=info,pipeline=info,relevance=info,warn")
        });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Thresholds, paths and models are fixed for the life of the process.
    let runtime = Runtime::from_env()?;

    let state = AppState::new(runtime.pipeline.clone());
    let mut router = api::router(state, &runtime.service);

    if runtime.service.metrics_enabled {
        let metrics = Metrics::init(&runtime.gate)?;
        router = router.merge(metrics.router());
    }

    Ok(router.into())
}
