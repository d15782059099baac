//! ONNX Runtime classifier for models exported from the training environment.
//!
//! Expects a single float input of shape `[batch, features]` and an int64
//! class label as the first output, which is the layout skl2onnx produces
//! for scikit-learn classifiers.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::artifact::Classifier;
use crate::error::{ArtifactError, InferenceError};

pub struct OnnxClassifier {
    // `Session::run` needs exclusive access.
    session: Mutex<Session>,
    input_name: String,
    n_features: Option<usize>,
}

impl OnnxClassifier {
    /// Load a model with ONNX Runtime and read its input layout.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| onnx_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| onnx_error(path, e))?;

        let input = session.inputs().first().ok_or_else(|| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason: "model has no inputs".into(),
        })?;
        let input_name = input.name().to_string();
        let n_features = infer_features(input.dtype());

        ensure_outputs(&session, path)?;

        info!(
            input = %input_name,
            features = ?n_features,
            model = %path.display(),
            "loaded onnx classifier"
        );
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            n_features,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn classes(&self) -> Option<&[i64]> {
        None
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let values: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let shape = [1i64, values.len() as i64];
        let tensor = Tensor::from_array((shape, values.into_boxed_slice()))
            .map_err(|e| InferenceError::new(format!("build input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::new("onnx session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| InferenceError::new(format!("run: {e}")))?;

        let (_, labels) = outputs[0]
            .try_extract_tensor::<i64>()
            .map_err(|e| InferenceError::new(format!("extract label: {e}")))?;
        let class_id = labels.first().copied();

        class_id.ok_or_else(|| InferenceError::new("model returned no label"))
    }
}

fn onnx_error(path: &Path, e: impl std::fmt::Display) -> ArtifactError {
    ArtifactError::Onnx {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn ensure_outputs(session: &Session, path: &Path) -> Result<(), ArtifactError> {
    if session.outputs().is_empty() {
        return Err(ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason: "model has no outputs".into(),
        });
    }
    Ok(())
}

/// Feature count from the last dimension of the input shape, if static.
fn infer_features(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecommendationEngine;
    use crate::scaler::FittedScaler;
    use crate::store::DomainArtifacts;
    use cfrs_core::Domain;
    use tempfile::TempDir;

    // Minimal protobuf writer for building ONNX test models in memory.

    fn varint(mut v: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                out.push(byte);
                return;
            }
            out.push(byte | 0x80);
        }
    }

    fn int_field(out: &mut Vec<u8>, field: u64, value: u64) {
        varint(field << 3, out);
        varint(value, out);
    }

    fn bytes_field(out: &mut Vec<u8>, field: u64, bytes: &[u8]) {
        varint((field << 3) | 2, out);
        varint(bytes.len() as u64, out);
        out.extend_from_slice(bytes);
    }

    /// ValueInfoProto for a tensor with a symbolic batch dimension.
    fn tensor_info(name: &str, elem_type: u64, width: Option<u64>) -> Vec<u8> {
        let mut batch = Vec::new();
        bytes_field(&mut batch, 2, b"batch");
        let mut shape = Vec::new();
        bytes_field(&mut shape, 1, &batch);
        if let Some(width) = width {
            let mut dim = Vec::new();
            int_field(&mut dim, 1, width);
            bytes_field(&mut shape, 1, &dim);
        }

        let mut tensor = Vec::new();
        int_field(&mut tensor, 1, elem_type);
        bytes_field(&mut tensor, 2, &shape);
        let mut type_proto = Vec::new();
        bytes_field(&mut type_proto, 1, &tensor);

        let mut info = Vec::new();
        bytes_field(&mut info, 1, name.as_bytes());
        bytes_field(&mut info, 2, &type_proto);
        info
    }

    fn int_attribute(name: &str, value: u64) -> Vec<u8> {
        let mut attr = Vec::new();
        bytes_field(&mut attr, 1, name.as_bytes());
        int_field(&mut attr, 3, value);
        int_field(&mut attr, 20, 2); // AttributeType::INT
        attr
    }

    /// Classifier model: float `[batch, n]` in, int64 `[batch]` argmax out.
    fn argmax_model(n_features: u64) -> Vec<u8> {
        const FLOAT: u64 = 1;
        const INT64: u64 = 7;

        let mut node = Vec::new();
        bytes_field(&mut node, 1, b"float_input");
        bytes_field(&mut node, 2, b"label");
        bytes_field(&mut node, 3, b"argmax");
        bytes_field(&mut node, 4, b"ArgMax");
        bytes_field(&mut node, 5, &int_attribute("axis", 1));
        bytes_field(&mut node, 5, &int_attribute("keepdims", 0));

        let mut graph = Vec::new();
        bytes_field(&mut graph, 1, &node);
        bytes_field(&mut graph, 2, b"argmax_classifier");
        bytes_field(&mut graph, 11, &tensor_info("float_input", FLOAT, Some(n_features)));
        bytes_field(&mut graph, 12, &tensor_info("label", INT64, None));

        let mut opset = Vec::new();
        int_field(&mut opset, 2, 13);

        let mut model = Vec::new();
        int_field(&mut model, 1, 8); // IR version
        bytes_field(&mut model, 7, &graph);
        bytes_field(&mut model, 8, &opset);
        model
    }

    fn write_model(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("crop.onnx");
        std::fs::write(&path, argmax_model(7)).unwrap();
        path
    }

    #[test]
    fn load_reads_input_layout() {
        let dir = TempDir::new().unwrap();
        let clf = OnnxClassifier::load(&write_model(&dir)).unwrap();
        assert_eq!(clf.input_name, "float_input");
        assert_eq!(clf.n_features(), Some(7));
        assert_eq!(clf.kind(), "onnx");
    }

    #[test]
    fn predict_crop_sample() {
        let dir = TempDir::new().unwrap();
        let clf = OnnxClassifier::load(&write_model(&dir)).unwrap();

        let class_id: i64 = clf
            .predict(&[90.0, 42.0, 43.0, 20.0, 82.0, 6.1, 202.0])
            .unwrap();
        assert_eq!(class_id, 6);
        assert_eq!(clf.predict(&[9.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap(), 0);
    }

    #[test]
    fn predict_through_engine() {
        let dir = TempDir::new().unwrap();
        let clf = OnnxClassifier::load(&write_model(&dir)).unwrap();
        let artifacts = DomainArtifacts::new(
            Domain::Crop,
            Box::new(FittedScaler::Identity { n_features: 7 }),
            Box::new(clf),
        )
        .unwrap();
        let engine = RecommendationEngine::new(artifacts);

        // Rainfall dominates: argmax index 6 → "Papaya".
        let rec = engine
            .recommend(&[90.0, 42.0, 43.0, 20.0, 82.0, 6.1, 202.0])
            .unwrap();
        assert_eq!(rec.class_id, 6);
        assert_eq!(rec.label(), "Papaya");

        // Index 0 has no label.
        let rec = engine.recommend(&[500.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert!(!rec.known);
        assert_eq!(rec.label(), "Unknown Crop");
    }

    #[test]
    fn load_missing_model() {
        let dir = TempDir::new().unwrap();
        let err = OnnxClassifier::load(&dir.path().join("crop.onnx")).err().unwrap();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn load_corrupt_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crop.onnx");
        std::fs::write(&path, b"not a protobuf").unwrap();
        let err = OnnxClassifier::load(&path).err().unwrap();
        assert!(matches!(err, ArtifactError::Onnx { .. }));
    }
}
