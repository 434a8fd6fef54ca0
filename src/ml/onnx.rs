//! Classifiers exported to ONNX, evaluated in-process with `tract`.

use std::path::Path;

use tract_onnx::prelude::*;

use crate::error::{FraudError, Result};
use crate::ml::Classifier;

type Plan = TypedRunnableModel<TypedModel>;

/// An ONNX graph pinned to a single `[1, input_dim]` f32 row.
#[derive(Clone)]
pub struct OnnxModel {
    plan: Plan,
    input_dim: usize,
    output_dim: usize,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_dim", &self.input_dim)
            .field("output_dim", &self.output_dim)
            .finish()
    }
}

fn load_error(stage: &str) -> impl Fn(TractError) -> FraudError + '_ {
    move |e| FraudError::ModelLoad(format!("onnx {stage}: {e}"))
}

fn row(input: &[f32]) -> std::result::Result<TValue, TractError> {
    let tensor = tract_ndarray::Array2::from_shape_vec((1, input.len()), input.to_vec())?;
    Ok(tensor.into_dyn().into_tvalue())
}

fn first_output(plan: &Plan, input: &[f32]) -> std::result::Result<Vec<f32>, TractError> {
    let outputs = plan.run(tvec!(row(input)?))?;
    let Some(out) = outputs.first() else {
        return Err(TractError::msg("graph produced no outputs"));
    };
    Ok(out.to_array_view::<f32>()?.iter().copied().collect())
}

impl OnnxModel {
    /// Parse, type and optimize the graph at `path` for one row of `input_dim` features.
    ///
    /// The output width is read off a zero-input run, so a graph that cannot
    /// execute fails here rather than on the first request.
    pub fn load_for_vec_input(path: &Path, input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(FraudError::Validation("input_dim must be > 0".to_string()));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_error("parse"))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, input_dim)),
            )
            .map_err(load_error("input fact"))?
            .into_optimized()
            .map_err(load_error("optimize"))?
            .into_runnable()
            .map_err(load_error("plan"))?;

        let output_dim = first_output(&plan, &vec![0.0; input_dim])
            .map_err(load_error("warm-up run"))?
            .len();
        if output_dim == 0 {
            return Err(FraudError::ModelLoad("onnx output is empty".to_string()));
        }

        Ok(Self {
            plan,
            input_dim,
            output_dim,
        })
    }

    /// Raw output row for one feature vector.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        if input.len() != self.input_dim {
            return Err(FraudError::Validation(format!(
                "onnx input has {} features, model expects {}",
                input.len(),
                self.input_dim
            )));
        }
        first_output(&self.plan, input).map_err(|e| FraudError::Inference(format!("onnx: {e}")))
    }
}

impl Classifier for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn logit(&self, input: &[f32]) -> Result<f64> {
        match self.predict(input)?.as_slice() {
            [z] => Ok(f64::from(*z)),
            other => Err(FraudError::Inference(format!(
                "onnx graph must emit one logit, got {}",
                other.len()
            ))),
        }
    }
}

#[cfg(all(test, feature = "onnx"))]
mod tests {
    use super::*;
    use crate::config::ModelFormat;
    use crate::ml::load_classifier;

    fn artifact(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn non_onnx_bytes_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact(&dir, "model.onnx", b"{\"input_dim\": 4, \"layers\": []}");
        assert!(matches!(
            load_classifier(&path, ModelFormat::Auto),
            Err(FraudError::ModelLoad(_))
        ));
    }

    #[test]
    fn corrupt_protobuf_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        // Field 15 with wire type 7 does not exist.
        let path = artifact(&dir, "corrupt.onnx", &[0x08, 0xff, 0xff, 0x1a, 0x7f, 0x00]);
        assert!(matches!(
            load_classifier(&path, ModelFormat::Auto),
            Err(FraudError::ModelLoad(_))
        ));
    }

    #[test]
    fn missing_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_classifier(&dir.path().join("absent.onnx"), ModelFormat::Auto),
            Err(FraudError::ModelLoad(_))
        ));
    }

    #[test]
    fn zero_width_input_is_rejected_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact(&dir, "model.onnx", b"");
        assert!(matches!(
            OnnxModel::load_for_vec_input(&path, 0),
            Err(FraudError::Validation(_))
        ));
    }
}
