//! Fixed per-feature affine normalization applied before the forward pass.

use serde::Serialize;

use crate::config::NormalizationConfig;
use crate::domain::FEATURE_COUNT;
use crate::error::{FraudError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureScaler {
    mean: [f64; FEATURE_COUNT],
    std: [f64; FEATURE_COUNT],
}

impl FeatureScaler {
    pub fn new(mean: &[f64], std: &[f64]) -> Result<Self> {
        let mean: [f64; FEATURE_COUNT] = mean.try_into().map_err(|_| {
            FraudError::InvalidConfig(format!(
                "normalization mean must have {FEATURE_COUNT} entries, got {}",
                mean.len()
            ))
        })?;
        let std: [f64; FEATURE_COUNT] = std.try_into().map_err(|_| {
            FraudError::InvalidConfig(format!(
                "normalization std must have {FEATURE_COUNT} entries, got {}",
                std.len()
            ))
        })?;
        if mean.iter().any(|v| !v.is_finite()) {
            return Err(FraudError::InvalidConfig(
                "normalization mean must be finite".to_string(),
            ));
        }
        if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(FraudError::InvalidConfig(
                "normalization std must be finite and > 0".to_string(),
            ));
        }
        Ok(Self { mean, std })
    }

    /// mean = 0, std = 1
    pub fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_COUNT],
            std: [1.0; FEATURE_COUNT],
        }
    }

    /// `(x - mean) / std`, element-wise.
    pub fn transform(&self, raw: &[f32; FEATURE_COUNT]) -> [f32; FEATURE_COUNT] {
        let mut out = [0.0_f32; FEATURE_COUNT];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = ((f64::from(raw[i]) - self.mean[i]) / self.std[i]) as f32;
        }
        out
    }
}

impl TryFrom<&NormalizationConfig> for FeatureScaler {
    type Error = FraudError;

    fn try_from(cfg: &NormalizationConfig) -> Result<Self> {
        Self::new(&cfg.mean, &cfg.std)
    }
}
