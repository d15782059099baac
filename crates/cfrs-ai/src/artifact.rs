//! Seams between the engine and the pre-trained artifacts it drives.
//!
//! Both traits take `&self` and require `Send + Sync`: artifacts are loaded
//! once and then shared read-only by every caller.

use crate::error::InferenceError;

/// A fitted normalization transform (e.g. a standard or min-max scaler).
pub trait Scaler: Send + Sync {
    /// Short name of the artifact format, for diagnostics.
    fn kind(&self) -> &'static str;

    /// Number of features the transform was fitted on.
    fn n_features(&self) -> usize;

    /// Check the fitted state is internally consistent.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Normalize one sample. `features.len()` equals [`n_features`](Self::n_features);
    /// the engine checks this before calling.
    fn transform(&self, features: &[f64]) -> Vec<f64>;
}

/// A trained classifier producing one integer class id per sample.
pub trait Classifier: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Number of input features, when the artifact declares it.
    fn n_features(&self) -> Option<usize>;

    /// Class ids the model can emit, when the artifact declares them.
    fn classes(&self) -> Option<&[i64]>;

    /// Check the fitted state is internally consistent.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Predict the class id of one normalized sample.
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError>;
}
