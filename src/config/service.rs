// src/config/service.rs
//! Serving-side settings: model/label/keyword paths, upload limit, CORS,
//! static frontend, metrics.

use std::path::PathBuf;

use super::{parse_flag, parse_or};

pub const DEFAULT_PLANT_MODEL_PATH: &str = "models/mobilenet_v2.onnx";
pub const DEFAULT_PLANT_LABELS_PATH: &str = "models/imagenet_class_index.json";
pub const DEFAULT_DISEASE_MODEL_PATH: &str = "models/potato_disease.onnx";
pub const DEFAULT_KEYWORDS_PATH: &str = "config/plant_keywords.toml";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend/build";
pub const DEFAULT_DISEASE_INPUT_SIZE: u32 = 256;
pub const DEFAULT_DIAGNOSTIC_TOP_N: usize = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

pub const ENV_PLANT_MODEL_PATH: &str = "PLANT_MODEL_PATH";
pub const ENV_PLANT_LABELS_PATH: &str = "PLANT_LABELS_PATH";
pub const ENV_DISEASE_MODEL_PATH: &str = "DISEASE_MODEL_PATH";
pub const ENV_KEYWORDS_PATH: &str = "PLANT_KEYWORDS_PATH";
pub const ENV_DISEASE_INPUT_SIZE: &str = "DISEASE_INPUT_SIZE";
pub const ENV_DIAGNOSTIC_TOP_N: &str = "DIAGNOSTIC_TOP_N";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const ENV_CORS_ALLOW_ORIGINS: &str = "CORS_ALLOW_ORIGINS";
pub const ENV_FRONTEND_DIR: &str = "FRONTEND_DIR";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub plant_model_path: PathBuf,
    pub plant_labels_path: PathBuf,
    pub disease_model_path: PathBuf,
    pub keywords_path: PathBuf,
    pub disease_input_size: u32,
    /// Ranked predictions echoed on a not-a-plant rejection; 0 disables.
    pub diagnostic_top_n: usize,
    pub max_upload_bytes: usize,
    pub cors_allow_origins: Vec<String>,
    pub frontend_dir: PathBuf,
    pub metrics_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            plant_model_path: DEFAULT_PLANT_MODEL_PATH.into(),
            plant_labels_path: DEFAULT_PLANT_LABELS_PATH.into(),
            disease_model_path: DEFAULT_DISEASE_MODEL_PATH.into(),
            keywords_path: DEFAULT_KEYWORDS_PATH.into(),
            disease_input_size: DEFAULT_DISEASE_INPUT_SIZE,
            diagnostic_top_n: DEFAULT_DIAGNOSTIC_TOP_N,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allow_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            frontend_dir: DEFAULT_FRONTEND_DIR.into(),
            metrics_enabled: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let d = Self::default();
        let path = |key: &str, default: PathBuf| -> PathBuf {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };

        let disease_input_size: u32 = parse_or(
            ENV_DISEASE_INPUT_SIZE,
            lookup(ENV_DISEASE_INPUT_SIZE),
            d.disease_input_size,
        )?;
        if disease_input_size == 0 {
            anyhow::bail!("{ENV_DISEASE_INPUT_SIZE} must be positive");
        }

        let max_upload_bytes: usize = parse_or(
            ENV_MAX_UPLOAD_BYTES,
            lookup(ENV_MAX_UPLOAD_BYTES),
            d.max_upload_bytes,
        )?;
        if max_upload_bytes == 0 {
            anyhow::bail!("{ENV_MAX_UPLOAD_BYTES} must be positive");
        }

        let cors_allow_origins: Vec<String> = match lookup(ENV_CORS_ALLOW_ORIGINS) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => d.cors_allow_origins.clone(),
        };
        // Credentialed CORS needs explicit origins; a wildcard is never valid here.
        if cors_allow_origins.iter().any(|o| o == "*") {
            anyhow::bail!("{ENV_CORS_ALLOW_ORIGINS} must list explicit origins, `*` is not allowed");
        }

        Ok(Self {
            plant_model_path: path(ENV_PLANT_MODEL_PATH, d.plant_model_path),
            plant_labels_path: path(ENV_PLANT_LABELS_PATH, d.plant_labels_path),
            disease_model_path: path(ENV_DISEASE_MODEL_PATH, d.disease_model_path),
            keywords_path: path(ENV_KEYWORDS_PATH, d.keywords_path),
            disease_input_size,
            diagnostic_top_n: parse_or(
                ENV_DIAGNOSTIC_TOP_N,
                lookup(ENV_DIAGNOSTIC_TOP_N),
                d.diagnostic_top_n,
            )?,
            max_upload_bytes,
            cors_allow_origins,
            frontend_dir: path(ENV_FRONTEND_DIR, d.frontend_dir),
            metrics_enabled: parse_flag(
                ENV_METRICS_ENABLED,
                lookup(ENV_METRICS_ENABLED),
                d.metrics_enabled,
            )?,
        })
    }
}
