// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod bootstrap;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod disease;
pub mod engine;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod pixels;
pub mod preprocess;
pub mod ranking;
pub mod relevance;
pub mod response;

#[cfg(feature = "onnx")]
pub mod onnx;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::classifier::{DynClassifier, ImageClassifier};
pub use crate::config::{GateConfig, ServiceConfig};
pub use crate::decision::{Outcome, RejectReason};
pub use crate::engine::DecisionPipeline;
pub use crate::error::ClassifyError;
pub use crate::pixels::PixelImage;
pub use crate::response::ClassifyResponse;
