//! Fraud scoring pipeline: normalize, forward pass, sigmoid, threshold.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::config::ModelConfig;
use crate::domain::{Prediction, TransactionFeatures, DEFAULT_THRESHOLD, FEATURE_NAMES};
use crate::error::{FraudError, Result};
use crate::ml::{load_classifier, sigmoid, Classifier, FeatureScaler};

/// Holds the model loaded at startup. Never reloaded; cheap to share.
#[derive(Debug, Clone)]
pub struct FraudDetector {
    model: Arc<dyn Classifier>,
    scaler: FeatureScaler,
    threshold: f64,
    source: Option<PathBuf>,
}

/// Static description of the loaded model, served by `GET /model`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub input_features: Vec<String>,
    pub output_dim: usize,
    pub threshold: f64,
    pub normalization: FeatureScaler,
    pub metadata: serde_json::Value,
}

impl FraudDetector {
    pub fn new(model: Arc<dyn Classifier>, scaler: FeatureScaler, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(FraudError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            model,
            scaler,
            threshold,
            source: None,
        })
    }

    /// Identity normalization and the default 0.5 boundary.
    pub fn with_defaults(model: Arc<dyn Classifier>) -> Self {
        Self {
            model,
            scaler: FeatureScaler::identity(),
            threshold: DEFAULT_THRESHOLD,
            source: None,
        }
    }

    /// Load the artifact named by `cfg` once and build the detector around it.
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let scaler = FeatureScaler::try_from(&cfg.normalization)?;
        let model = load_classifier(&cfg.path, cfg.format)?;
        let mut detector = Self::new(model, scaler, cfg.threshold)?;
        detector.source = Some(cfg.path.clone());
        Ok(detector)
    }

    pub fn predict(&self, features: &TransactionFeatures) -> Result<Prediction> {
        let normalized = self.scaler.transform(&features.to_array());
        let logit = self.model.logit(&normalized)?;
        if logit.is_nan() {
            return Err(FraudError::Inference("model produced NaN logit".to_string()));
        }

        let prediction = Prediction::from_probability(sigmoid(logit), self.threshold);
        debug!(
            logit,
            probability = prediction.fraud_probability,
            flagged = prediction.is_fraudulent,
            "transaction scored"
        );
        Ok(prediction)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            format: self.model.kind().to_string(),
            source: self.source.as_ref().map(|p| p.display().to_string()),
            input_features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            output_dim: self.model.output_dim(),
            threshold: self.threshold,
            normalization: self.scaler.clone(),
            metadata: self.model.metadata(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{Activation, DenseLayer, DenseNetwork};

    fn net(weights: [f64; 4], bias: f64) -> Arc<dyn Classifier> {
        Arc::new(DenseNetwork {
            input_dim: 4,
            layers: vec![DenseLayer {
                weights: vec![weights.to_vec()],
                bias: vec![bias],
                activation: Activation::Linear,
            }],
            metadata: serde_json::json!({ "version": "test" }),
        })
    }

    #[derive(Debug)]
    struct NanModel;

    impl Classifier for NanModel {
        fn kind(&self) -> &'static str {
            "nan"
        }
        fn input_dim(&self) -> usize {
            4
        }
        fn output_dim(&self) -> usize {
            1
        }
        fn logit(&self, _input: &[f32]) -> Result<f64> {
            Ok(f64::NAN)
        }
    }

    fn sample() -> TransactionFeatures {
        TransactionFeatures {
            amount: 100.0,
            time_of_day: 12,
            mismatch: 0,
            frequency: 1,
        }
    }

    #[test]
    fn zero_logit_is_flagged_at_boundary() {
        let d = FraudDetector::with_defaults(net([0.0; 4], 0.0));
        let p = d.predict(&sample()).unwrap();
        assert_eq!(p.fraud_probability, 0.5);
        assert!(p.is_fraudulent);
    }

    #[test]
    fn normalization_feeds_the_model() {
        // Only the mismatch weight matters; mean shifts it from 0 to -1.
        let scaler = FeatureScaler::new(&[0.0, 0.0, 1.0, 0.0], &[1.0; 4]).unwrap();
        let d = FraudDetector::new(net([0.0, 0.0, 4.0, 0.0], 0.0), scaler, 0.5).unwrap();
        let p = d.predict(&sample()).unwrap();
        assert!((p.fraud_probability - sigmoid(-4.0)).abs() < 1e-9);
        assert!(!p.is_fraudulent);
    }

    #[test]
    fn probability_bounds_and_threshold_hold() {
        let d = FraudDetector::with_defaults(net([0.01, -0.2, 3.0, 0.5], -1.0));
        for amount in [0.0, 1.0, 99.5, 1e6, -1e6] {
            for mismatch in [0, 1] {
                let f = TransactionFeatures {
                    amount,
                    time_of_day: 3,
                    mismatch,
                    frequency: 10,
                };
                let p = d.predict(&f).unwrap();
                assert!((0.0..=1.0).contains(&p.fraud_probability));
                assert_eq!(p.is_fraudulent, p.fraud_probability >= 0.5);
            }
        }
    }

    #[test]
    fn custom_threshold_applies() {
        let d = FraudDetector::new(net([0.0; 4], 1.0), FeatureScaler::identity(), 0.9).unwrap();
        let p = d.predict(&sample()).unwrap();
        assert!(p.fraud_probability > 0.5);
        assert!(!p.is_fraudulent);
    }

    #[test]
    fn rejects_invalid_threshold() {
        assert!(FraudDetector::new(net([0.0; 4], 0.0), FeatureScaler::identity(), -0.1).is_err());
    }

    #[test]
    fn nan_logit_is_an_inference_error() {
        let d = FraudDetector::with_defaults(Arc::new(NanModel));
        assert!(matches!(d.predict(&sample()), Err(FraudError::Inference(_))));
    }

    #[test]
    fn info_describes_model() {
        let d = FraudDetector::with_defaults(net([0.0; 4], 0.0));
        let info = d.info();
        assert_eq!(info.format, "dense");
        assert_eq!(info.input_features, FEATURE_NAMES.to_vec());
        assert_eq!(info.metadata["version"], "test");
        assert!(info.source.is_none());
    }
}
