//! Dense neural network inference (CPU-only).
//!
//! Small MLPs exported from training as JSON. The network produces a raw
//! logit; the sigmoid is applied by the caller.
//!
//! Design goals:
//! - Stable, deterministic, dependency-light.
//! - Explicit shape validation at load time (fail fast, never per request).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FraudError, Result};
use crate::ml::Classifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weights shape: [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn in_dim(&self) -> usize {
        self.weights.first().map(|r| r.len()).unwrap_or(0)
    }

    fn out_dim(&self) -> usize {
        self.weights.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    /// Expected input dimension.
    pub input_dim: usize,

    pub layers: Vec<DenseLayer>,

    /// Optional free-form metadata (versioning, training info, etc).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl DenseNetwork {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FraudError::ModelLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        let model: Self = serde_json::from_str(&content).map_err(|e| {
            FraudError::ModelLoad(format!("cannot parse {}: {e}", path.display()))
        })?;
        model.validate().map_err(FraudError::ModelLoad)?;
        Ok(model)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be > 0".to_string());
        }
        if self.layers.is_empty() {
            return Err("layers must not be empty".to_string());
        }

        let mut expected_in = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(format!("layer[{idx}] out_dim must be > 0"));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                ));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(format!(
                        "layer[{idx}] weights row {r} len {} != expected in_dim {expected_in}",
                        row.len()
                    ));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(format!("layer[{idx}] weights contain non-finite values"));
                }
            }
            if layer.bias.iter().any(|v| !v.is_finite()) {
                return Err(format!("layer[{idx}] bias contain non-finite values"));
            }
            expected_in = layer.out_dim();
        }
        Ok(())
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.out_dim()).unwrap_or(0)
    }

    pub fn output_activation(&self) -> Activation {
        self.layers
            .last()
            .map(|l| l.activation)
            .unwrap_or_default()
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_dim {
            return Err(FraudError::Validation(format!(
                "DenseNetwork input dim mismatch: got {}, expected {}",
                input.len(),
                self.input_dim
            )));
        }

        let mut x: Vec<f64> = input.to_vec();

        for layer in &self.layers {
            let in_dim = layer.in_dim();
            x = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, bias)| {
                    debug_assert_eq!(row.len(), in_dim);
                    let sum = bias + row.iter().zip(&x).map(|(w, v)| w * v).sum::<f64>();
                    apply_activation(sum, layer.activation)
                })
                .collect();
        }

        Ok(x)
    }

    pub fn forward_scalar(&self, input: &[f64]) -> Result<f64> {
        let out = self.forward(input)?;
        if out.len() != 1 {
            return Err(FraudError::Validation(format!(
                "DenseNetwork forward_scalar expects output_dim=1, got {}",
                out.len()
            )));
        }
        Ok(out[0])
    }
}

impl Classifier for DenseNetwork {
    fn kind(&self) -> &'static str {
        "dense"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        DenseNetwork::output_dim(self)
    }

    fn metadata(&self) -> serde_json::Value {
        self.metadata.clone()
    }

    fn logit(&self, input: &[f32]) -> Result<f64> {
        let input: Vec<f64> = input.iter().map(|v| f64::from(*v)).collect();
        self.forward_scalar(&input)
    }
}

fn apply_activation(x: f64, act: Activation) -> f64 {
    match act {
        Activation::Linear => x,
        Activation::Relu => x.max(0.0),
        Activation::Tanh => x.tanh(),
        Activation::Sigmoid => sigmoid(x),
    }
}

/// Numerically-stable logistic function.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(weights: Vec<f64>, bias: f64) -> DenseNetwork {
        DenseNetwork {
            input_dim: weights.len(),
            layers: vec![DenseLayer {
                weights: vec![weights],
                bias: vec![bias],
                activation: Activation::Linear,
            }],
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn forward_scalar_linear_logit() {
        let net = linear(vec![1.0, 2.0], 0.5);
        net.validate().unwrap();

        let z = net.forward_scalar(&[1.0, 1.0]).unwrap();
        assert!((z - 3.5).abs() < 1e-12);
    }

    #[test]
    fn hidden_relu_layer() {
        let net = DenseNetwork {
            input_dim: 2,
            layers: vec![
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![0.0, -1.0]],
                    bias: vec![0.0, 0.0],
                    activation: Activation::Relu,
                },
                DenseLayer {
                    weights: vec![vec![1.0, 1.0]],
                    bias: vec![0.0],
                    activation: Activation::Linear,
                },
            ],
            metadata: serde_json::Value::Null,
        };
        net.validate().unwrap();
        // relu(2) + relu(-3) = 2
        assert_eq!(net.forward_scalar(&[2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn validates_shapes() {
        let mut bad = linear(vec![1.0, 2.0], 0.0);
        bad.input_dim = 3;
        assert!(bad.validate().is_err());

        let mut bad = linear(vec![1.0, f64::NAN], 0.0);
        bad.input_dim = 2;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_wrong_input_len() {
        let net = linear(vec![1.0, 2.0], 0.0);
        assert!(net.forward(&[1.0]).is_err());
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"input_dim": 2, "layers": [{"weights": [[0.5, -0.5]], "bias": [0.1]}]}"#,
        )
        .unwrap();

        let net = DenseNetwork::from_file(&path).unwrap();
        assert_eq!(net.output_activation(), Activation::Linear);
        assert_eq!(Classifier::output_dim(&net), 1);

        let missing = DenseNetwork::from_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(FraudError::ModelLoad(_))));
    }
}
