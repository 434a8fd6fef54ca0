use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::FEATURE_COUNT;
use crate::error::{FraudError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How the model artifact on disk is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// Pick from the file extension (`.onnx` => onnx, otherwise dense JSON)
    #[default]
    Auto,
    Dense,
    Onnx,
}

impl ModelFormat {
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto => {
                let is_onnx = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("onnx"));
                if is_onnx {
                    Self::Onnx
                } else {
                    Self::Dense
                }
            }
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Dense => "dense",
            Self::Onnx => "onnx",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized model artifact
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: ModelFormat,
    /// Decision boundary applied to the fraud probability
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub normalization: NormalizationConfig,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/fraud_prevention_model.json")
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            format: ModelFormat::default(),
            threshold: default_threshold(),
            normalization: NormalizationConfig::default(),
        }
    }
}

/// Per-feature z-score statistics.
///
/// The defaults are identity placeholders; real deployments should supply
/// the statistics computed on the training set.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default = "default_mean")]
    pub mean: Vec<f64>,
    #[serde(default = "default_std")]
    pub std: Vec<f64>,
}

fn default_mean() -> Vec<f64> {
    vec![0.0; FEATURE_COUNT]
}

fn default_std() -> Vec<f64> {
    vec![1.0; FEATURE_COUNT]
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            mean: default_mean(),
            std: default_std(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("model.threshold", default_threshold())?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("FRAUDGUARD_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (FRAUDGUARD_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("FRAUDGUARD")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("model.normalization.mean")
                    .with_list_parse_key("model.normalization.std"),
            );

        builder.build()?.try_deserialize()
    }

    /// Reject values that would make the scoring pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        let threshold = self.model.threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(FraudError::InvalidConfig(format!(
                "model.threshold must be within [0, 1], got {threshold}"
            )));
        }

        let norm = &self.model.normalization;
        if norm.mean.len() != FEATURE_COUNT {
            return Err(FraudError::InvalidConfig(format!(
                "model.normalization.mean must have {FEATURE_COUNT} entries, got {}",
                norm.mean.len()
            )));
        }
        if norm.std.len() != FEATURE_COUNT {
            return Err(FraudError::InvalidConfig(format!(
                "model.normalization.std must have {FEATURE_COUNT} entries, got {}",
                norm.std.len()
            )));
        }
        if norm.mean.iter().any(|v| !v.is_finite()) {
            return Err(FraudError::InvalidConfig(
                "model.normalization.mean must be finite".to_string(),
            ));
        }
        if norm.std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(FraudError::InvalidConfig(
                "model.normalization.std must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
