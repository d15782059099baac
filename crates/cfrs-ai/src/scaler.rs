//! Fitted feature scalers exported as JSON.
//!
//! The statistics are the fitted attributes of the training-time scaler,
//! exported once (`mean_`/`scale_` for a standard scaler, `min_`/`scale_` for
//! a min-max scaler):
//!
//! ```json
//! {"kind": "standard", "mean": [50.5, 53.4, ...], "scale": [36.9, 32.9, ...]}
//! {"kind": "min_max", "min": [0.0, -0.04, ...], "scale": [0.007, 0.007, ...]}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::Scaler;
use crate::error::ArtifactError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// `(x - mean) / scale`.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    /// Pass-through, for models trained on raw features.
    Identity { n_features: usize },
}

impl FittedScaler {
    /// Load and validate a scaler from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scaler: Self = serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        scaler.validate().map_err(|reason| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        info!(
            kind = scaler.kind(),
            features = scaler.n_features(),
            path = %path.display(),
            "loaded scaler"
        );
        Ok(scaler)
    }
}

impl Scaler for FittedScaler {
    fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
            Self::Identity { .. } => "identity",
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
            Self::Identity { n_features } => *n_features,
        }
    }

    fn transform(&self, features: &[f64]) -> Vec<f64> {
        match self {
            Self::Standard { mean, scale } => features
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| {
                    // Constant features were fitted with zero variance.
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            Self::MinMax { min, scale } => features
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
            Self::Identity { .. } => features.to_vec(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let (offsets, scale, offset_name) = match self {
            Self::Standard { mean, scale } => (mean, scale, "mean"),
            Self::MinMax { min, scale } => (min, scale, "min"),
            Self::Identity { n_features } => {
                if *n_features == 0 {
                    return Err("identity scaler has zero features".into());
                }
                return Ok(());
            }
        };

        if offsets.is_empty() {
            return Err(format!("{offset_name} is empty"));
        }
        if offsets.len() != scale.len() {
            return Err(format!(
                "{offset_name} has {} values but scale has {}",
                offsets.len(),
                scale.len()
            ));
        }
        if let Some(i) = offsets
            .iter()
            .chain(scale)
            .position(|v| !v.is_finite())
        {
            return Err(format!("non-finite statistic at position {i}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn standard_transform() {
        let scaler = FittedScaler::Standard {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 4.0],
        };
        assert_eq!(scaler.transform(&[14.0, -8.0]), vec![2.0, -2.0]);
    }

    #[test]
    fn standard_zero_scale_treated_as_one() {
        let scaler = FittedScaler::Standard {
            mean: vec![1.0],
            scale: vec![0.0],
        };
        assert_eq!(scaler.transform(&[3.5]), vec![2.5]);
    }

    #[test]
    fn min_max_transform() {
        let scaler = FittedScaler::MinMax {
            min: vec![-1.0, 0.0],
            scale: vec![0.5, 0.01],
        };
        assert_eq!(scaler.transform(&[4.0, 200.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn identity_passes_through() {
        let scaler = FittedScaler::Identity { n_features: 3 };
        assert_eq!(scaler.transform(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
        assert_eq!(scaler.n_features(), 3);
    }

    #[test]
    fn transform_is_deterministic() {
        let scaler = FittedScaler::Standard {
            mean: vec![50.0, 53.0, 48.0],
            scale: vec![36.9, 32.9, 50.6],
        };
        let x = [90.0, 42.0, 43.0];
        assert_eq!(scaler.transform(&x), scaler.transform(&x));
    }

    #[test]
    fn load_standard_from_json() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "crop_scaler.json",
            r#"{"kind": "standard", "mean": [1, 2, 3], "scale": [1, 1, 2]}"#,
        );
        let scaler = FittedScaler::load(&path).unwrap();
        assert_eq!(scaler.kind(), "standard");
        assert_eq!(scaler.n_features(), 3);
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FittedScaler::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn load_corrupt_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.json", "{\"kind\": \"standard\", \"mean\": [");
        let err = FittedScaler::load(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Json { .. }));
    }

    #[test]
    fn load_rejects_unknown_kind() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "robust.json", r#"{"kind": "robust", "center": [1]}"#);
        assert!(matches!(
            FittedScaler::load(&path).unwrap_err(),
            ArtifactError::Json { .. }
        ));
    }

    #[test]
    fn load_rejects_mismatched_lengths() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "uneven.json",
            r#"{"kind": "min_max", "min": [0, 0], "scale": [1]}"#,
        );
        let err = FittedScaler::load(&path).unwrap_err();
        match err {
            ArtifactError::Invalid { reason, .. } => {
                assert!(reason.contains("min has 2 values"), "got: {reason}");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_empty_statistics() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "empty.json",
            r#"{"kind": "standard", "mean": [], "scale": []}"#,
        );
        assert!(matches!(
            FittedScaler::load(&path).unwrap_err(),
            ArtifactError::Invalid { .. }
        ));
    }
}
