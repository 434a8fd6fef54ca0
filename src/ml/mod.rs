//! Model artifacts and the inference seam.
//!
//! Dense JSON networks are always available. ONNX graphs are served through
//! `tract` behind the `onnx` feature so the default build stays light.

pub mod dense;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod scaler;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::ModelFormat;
use crate::domain::FEATURE_COUNT;
use crate::error::{FraudError, Result};

pub use dense::{sigmoid, Activation, DenseLayer, DenseNetwork};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
pub use scaler::FeatureScaler;

/// A loaded binary classifier that maps one normalized row to a logit.
///
/// Implementations are immutable after load and shared across requests.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Short artifact format name ("dense", "onnx").
    fn kind(&self) -> &'static str;

    fn input_dim(&self) -> usize;

    fn output_dim(&self) -> usize;

    fn metadata(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Forward pass. Returns the raw score before the sigmoid.
    fn logit(&self, input: &[f32]) -> Result<f64>;
}

/// Load the model artifact at `path` and check it fits the scoring pipeline.
pub fn load_classifier(path: &Path, format: ModelFormat) -> Result<Arc<dyn Classifier>> {
    let format = format.resolve(path);
    let model: Arc<dyn Classifier> = match format {
        ModelFormat::Onnx => load_onnx(path)?,
        ModelFormat::Dense | ModelFormat::Auto => {
            let net = DenseNetwork::from_file(path)?;
            if net.output_activation() != Activation::Linear {
                return Err(FraudError::ModelLoad(format!(
                    "output layer must be linear (model emits a logit), got {:?}",
                    net.output_activation()
                )));
            }
            Arc::new(net)
        }
    };

    if model.input_dim() != FEATURE_COUNT {
        return Err(FraudError::ModelLoad(format!(
            "model expects {} inputs, service provides {FEATURE_COUNT}",
            model.input_dim()
        )));
    }
    if model.output_dim() != 1 {
        return Err(FraudError::ModelLoad(format!(
            "model must produce a single logit, got output_dim={}",
            model.output_dim()
        )));
    }

    info!(
        path = %path.display(),
        format = format.as_str(),
        "model loaded"
    );
    Ok(model)
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Arc<dyn Classifier>> {
    Ok(Arc::new(OnnxModel::load_for_vec_input(path, FEATURE_COUNT)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Arc<dyn Classifier>> {
    Err(FraudError::ModelLoad(format!(
        "{} is an ONNX model but this build lacks the `onnx` feature",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_dense_logit_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "m.json",
            r#"{"input_dim": 4, "layers": [{"weights": [[0.1, 0.2, 0.3, 0.4]], "bias": [0.0]}]}"#,
        );
        let model = load_classifier(&path, ModelFormat::Auto).unwrap();
        assert_eq!(model.kind(), "dense");
        let z = model.logit(&[1.0, 1.0, 1.0, 1.0]).unwrap();
        assert!((z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_sigmoid_output_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "m.json",
            r#"{"input_dim": 4, "layers": [{"weights": [[1, 1, 1, 1]], "bias": [0], "activation": "sigmoid"}]}"#,
        );
        assert!(matches!(
            load_classifier(&path, ModelFormat::Dense),
            Err(FraudError::ModelLoad(_))
        ));
    }

    #[test]
    fn rejects_wrong_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let three_inputs = write(
            &dir,
            "three.json",
            r#"{"input_dim": 3, "layers": [{"weights": [[1, 1, 1]], "bias": [0]}]}"#,
        );
        assert!(load_classifier(&three_inputs, ModelFormat::Dense).is_err());

        let two_outputs = write(
            &dir,
            "two.json",
            r#"{"input_dim": 4, "layers": [{"weights": [[1, 1, 1, 1], [0, 0, 0, 0]], "bias": [0, 0]}]}"#,
        );
        assert!(load_classifier(&two_outputs, ModelFormat::Dense).is_err());
    }

    #[test]
    fn corrupt_artifact_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "m.json", "\u{0}\u{1}garbage");
        assert!(matches!(
            load_classifier(&path, ModelFormat::Auto),
            Err(FraudError::ModelLoad(_))
        ));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_requires_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "m.onnx", "");
        assert!(matches!(
            load_classifier(&path, ModelFormat::Auto),
            Err(FraudError::ModelLoad(_))
        ));
    }
}
