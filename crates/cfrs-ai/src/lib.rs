//! Inference layer: fitted scalers, trained classifiers, and the recommendation engine.

mod artifact;
mod classifier;
mod engine;
mod error;
mod scaler;
mod store;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

pub use artifact::{Classifier, Scaler};
pub use classifier::JsonClassifier;
pub use engine::{Recommendation, RecommendationEngine, Recommender};
pub use error::{ArtifactError, InferenceError, RecommendError};
pub use scaler::FittedScaler;
pub use store::{ArtifactPaths, ArtifactStore, DomainArtifacts, load_classifier, load_scaler};
