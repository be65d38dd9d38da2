//! TOML engine configuration.
//!
//! ```toml
//! [evaluation]
//! quality = "high"
//! temperature_k = 293.15
//!
//! [certification]
//! level = "industrial"
//! reciprocity_tolerance = 1e-6
//!
//! [drift]
//! threshold = 0.05
//!
//! [neural]
//! max_correction = 0.2
//! seed = 42
//! hidden_layers = 2
//! hidden_width = 16
//! ```
//!
//! Every section and field is optional.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bsdf::neural::DEFAULT_MAX_CORRECTION;
use crate::bsdf::temporal::DEFAULT_DRIFT_THRESHOLD;
use crate::bsdf::{Bsdf, DriftTracker, NeuralCorrected, SirenConfig};
use crate::error::BuildError;
use crate::types::{CertificationLevel, EvalMaterialContext, QualityTier, ROOM_TEMPERATURE_K};
use crate::validation::{NeuralAuditor, DEFAULT_RECIPROCITY_TOLERANCE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid setting: {0}")]
    Invalid(#[from] BuildError),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub certification: CertificationConfig,
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub neural: NeuralConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub quality: QualityTier,
    #[serde(default = "default_temperature")]
    pub temperature_k: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            quality: QualityTier::default(),
            temperature_k: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationConfig {
    #[serde(default)]
    pub level: CertificationLevel,
    #[serde(default = "default_reciprocity_tolerance")]
    pub reciprocity_tolerance: f64,
}

impl Default for CertificationConfig {
    fn default() -> Self {
        Self {
            level: CertificationLevel::default(),
            reciprocity_tolerance: default_reciprocity_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    #[serde(default = "default_drift_threshold")]
    pub threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            threshold: default_drift_threshold(),
        }
    }
}

/// SIREN settings for neural corrections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralConfig {
    #[serde(default = "default_max_correction")]
    pub max_correction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: usize,
    #[serde(default = "default_hidden_width")]
    pub hidden_width: usize,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            max_correction: default_max_correction(),
            seed: default_seed(),
            hidden_layers: default_hidden_layers(),
            hidden_width: default_hidden_width(),
        }
    }
}

fn default_temperature() -> f64 {
    ROOM_TEMPERATURE_K
}
fn default_reciprocity_tolerance() -> f64 {
    DEFAULT_RECIPROCITY_TOLERANCE
}
fn default_drift_threshold() -> f64 {
    DEFAULT_DRIFT_THRESHOLD
}
fn default_max_correction() -> f64 {
    DEFAULT_MAX_CORRECTION
}
fn default_seed() -> u64 {
    42
}
fn default_hidden_layers() -> usize {
    2
}
fn default_hidden_width() -> usize {
    16
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Evaluation context for the configured tier and temperature.
    pub fn eval_context(&self) -> Result<EvalMaterialContext, BuildError> {
        EvalMaterialContext::new(self.evaluation.quality).with_temperature(self.evaluation.temperature_k)
    }

    pub fn auditor(&self) -> NeuralAuditor {
        NeuralAuditor::new(self.certification.level)
    }

    pub fn drift_tracker(&self) -> Result<DriftTracker, BuildError> {
        DriftTracker::new(self.drift.threshold)
    }

    pub fn siren(&self) -> SirenConfig {
        SirenConfig {
            hidden_layers: self.neural.hidden_layers,
            hidden_width: self.neural.hidden_width,
            seed: self.neural.seed,
            ..SirenConfig::default()
        }
    }

    /// Wrap `inner` with a network built from the `[neural]` section.
    pub fn neural_corrected<B: Bsdf>(&self, inner: B) -> Result<NeuralCorrected<B>, BuildError> {
        NeuralCorrected::with_config(inner, &self.siren(), self.neural.max_correction)
    }
}

/// Load, parse and validate a TOML engine configuration file.
pub fn load_config(path: &std::path::Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = EngineConfig::from_toml_str(&content)?;
    config.eval_context()?;
    config.drift_tracker()?;
    log::debug!("loaded engine config from {}", path.display());
    Ok(config)
}
