// src/config/gate.rs
//! Gate thresholds (`PLANT_THRESHOLD`, `CONF_THRESHOLD`).
//!
//! Unlike a clamp-on-read setting, an out-of-range or unparsable threshold is a
//! startup failure: the process must not run with a gate nobody asked for.

use super::parse_or;

pub const DEFAULT_PLANT_THRESHOLD: f32 = 0.35;
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.80;

pub const ENV_PLANT_THRESHOLD: &str = "PLANT_THRESHOLD";
pub const ENV_CONF_THRESHOLD: &str = "CONF_THRESHOLD";

/// Immutable pair of gate thresholds, both validated to lie in [0,1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    plant_threshold: f32,
    conf_threshold: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            plant_threshold: DEFAULT_PLANT_THRESHOLD,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
        }
    }
}

impl GateConfig {
    pub fn new(plant_threshold: f32, conf_threshold: f32) -> anyhow::Result<Self> {
        Ok(Self {
            plant_threshold: check_unit(ENV_PLANT_THRESHOLD, plant_threshold)?,
            conf_threshold: check_unit(ENV_CONF_THRESHOLD, conf_threshold)?,
        })
    }

    /// Read both thresholds from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`GateConfig::from_env`] but over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let plant = parse_or(
            ENV_PLANT_THRESHOLD,
            lookup(ENV_PLANT_THRESHOLD),
            DEFAULT_PLANT_THRESHOLD,
        )?;
        let conf = parse_or(
            ENV_CONF_THRESHOLD,
            lookup(ENV_CONF_THRESHOLD),
            DEFAULT_CONF_THRESHOLD,
        )?;
        Self::new(plant, conf)
    }

    pub fn plant_threshold(&self) -> f32 {
        self.plant_threshold
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }
}

fn check_unit(name: &str, v: f32) -> anyhow::Result<f32> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        anyhow::bail!("{name} must lie in [0, 1], got {v}")
    }
}
