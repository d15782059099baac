use std::path::PathBuf;

use cfrs_core::{Domain, EncodeError};
use thiserror::Error;

/// Failure loading or validating an artifact. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("unsupported artifact format: {0} (expected .json or .onnx)")]
    UnsupportedFormat(PathBuf),

    #[error("{0} is an ONNX model but this build has no ONNX support (enable the `onnx` feature)")]
    OnnxDisabled(PathBuf),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime failed to load {path}: {message}")]
    Onnx { path: PathBuf, message: String },

    #[error("invalid {domain} {role}: {reason}")]
    Malformed {
        domain: Domain,
        role: &'static str,
        reason: String,
    },

    #[error("{domain} {role} takes {actual} features, {domain} vectors have {expected}")]
    FeatureCount {
        domain: Domain,
        role: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("expected {expected} artifacts, got {actual}")]
    DomainMismatch { expected: Domain, actual: Domain },
}

/// A classifier failed to produce a class id.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct InferenceError(pub String);

impl InferenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure serving a single recommendation.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// A category name is not in its code table. Caller-correctable.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The vector handed to the engine has the wrong length.
    #[error("{domain} feature vector has {actual} values, expected {expected}")]
    InvalidFeatureShape {
        domain: Domain,
        expected: usize,
        actual: usize,
    },

    #[error("{domain} inference failed: {source}")]
    Inference {
        domain: Domain,
        #[source]
        source: InferenceError,
    },
}
