//! Pure-Rust classifiers exported as JSON.
//!
//! Two model families whose fitted state is a handful of per-class vectors:
//!
//! - `linear`: one coefficient row and intercept per class; predicts the class
//!   with the highest decision score `w·x + b`. A two-class model may carry a
//!   single row, in which case a positive score selects the second class.
//! - `nearest_centroid`: one centroid per class; predicts the class whose
//!   centroid is closest in Euclidean distance.
//!
//! ```json
//! {"kind": "nearest_centroid", "classes": [1, 2], "centroids": [[...], [...]]}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::Classifier;
use crate::error::{ArtifactError, InferenceError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonClassifier {
    Linear {
        classes: Vec<i64>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    NearestCentroid {
        classes: Vec<i64>,
        centroids: Vec<Vec<f64>>,
    },
}

impl JsonClassifier {
    /// Load and validate a classifier from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate().map_err(|reason| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(
            kind = model.kind(),
            features = model.dim(),
            classes = model.class_ids().len(),
            path = %path.display(),
            "loaded classifier"
        );
        Ok(model)
    }

    fn class_ids(&self) -> &[i64] {
        match self {
            Self::Linear { classes, .. } | Self::NearestCentroid { classes, .. } => classes,
        }
    }

    fn rows(&self) -> &[Vec<f64>] {
        match self {
            Self::Linear { coefficients, .. } => coefficients,
            Self::NearestCentroid { centroids, .. } => centroids,
        }
    }

    /// Input dimensionality (length of every row).
    fn dim(&self) -> usize {
        self.rows().first().map(|r| r.len()).unwrap_or(0)
    }
}

impl Classifier for JsonClassifier {
    fn kind(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::NearestCentroid { .. } => "nearest_centroid",
        }
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.dim())
    }

    fn classes(&self) -> Option<&[i64]> {
        Some(self.class_ids())
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let dim = self.dim();
        if features.len() != dim {
            return Err(InferenceError::new(format!(
                "sample has {} features, model expects {dim}",
                features.len()
            )));
        }

        match self {
            Self::Linear {
                classes,
                coefficients,
                intercepts,
            } => {
                if intercepts.len() != coefficients.len() {
                    return Err(InferenceError::new(format!(
                        "{} intercepts for {} weight rows",
                        intercepts.len(),
                        coefficients.len()
                    )));
                }
                if let ([w], [b], &[negative, positive]) =
                    (coefficients.as_slice(), intercepts.as_slice(), classes.as_slice())
                {
                    let score = dot(w, features) + b;
                    if score.is_nan() {
                        return Err(InferenceError::new("NaN decision score"));
                    }
                    return Ok(if score > 0.0 { positive } else { negative });
                }
                let scores = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(w, b)| dot(w, features) + b);
                best_match(classes, scores)
            }
            Self::NearestCentroid { classes, centroids } => {
                // Negated squared distance so the best match is the maximum.
                let scores = centroids.iter().map(|c| -squared_distance(c, features));
                best_match(classes, scores)
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        let classes = self.class_ids();
        let rows = self.rows();

        if classes.is_empty() {
            return Err("no classes".into());
        }

        let binary_linear = matches!(self, Self::Linear { .. }) && classes.len() == 2 && rows.len() == 1;
        if rows.len() != classes.len() && !binary_linear {
            return Err(format!(
                "{} classes but {} weight rows",
                classes.len(),
                rows.len()
            ));
        }

        let dim = self.dim();
        if dim == 0 {
            return Err("weight rows are empty".into());
        }
        if let Some(i) = rows.iter().position(|r| r.len() != dim) {
            return Err(format!("row {i} has {} values, expected {dim}", rows[i].len()));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err("non-finite weight".into());
        }

        if let Self::Linear { intercepts, .. } = self
            && intercepts.len() != rows.len()
        {
            return Err(format!(
                "{} intercepts for {} weight rows",
                intercepts.len(),
                rows.len()
            ));
        }
        Ok(())
    }
}

/// Class with the highest score; the first one wins ties.
fn best_match(classes: &[i64], scores: impl Iterator<Item = f64>) -> Result<i64, InferenceError> {
    let mut best: Option<(i64, f64)> = None;

    for (&class, score) in classes.iter().zip(scores) {
        if score.is_nan() {
            return Err(InferenceError::new(format!("NaN score for class {class}")));
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((class, score)),
        }
    }

    best.map(|(class, _)| class)
        .ok_or_else(|| InferenceError::new("model has no classes"))
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
