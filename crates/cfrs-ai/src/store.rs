//! Artifact store: the four pre-trained artifacts, loaded once at startup.
//!
//! Artifacts come in domain pairs (classifier + scaler). A pair is validated
//! as a unit: both must load and both must agree with the domain's feature
//! count. [`ArtifactStore::load`] loads both pairs and fails on the first
//! error; [`DomainArtifacts::load`] loads a single pair on its own.

use std::path::{Path, PathBuf};

use cfrs_core::Domain;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::{Classifier, Scaler};
use crate::classifier::JsonClassifier;
use crate::error::ArtifactError;
use crate::scaler::FittedScaler;

pub const CROP_MODEL_FILE: &str = "crop.onnx";
pub const CROP_SCALER_FILE: &str = "crop_scaler.json";
pub const FERTILIZER_MODEL_FILE: &str = "fertilizer.onnx";
pub const FERTILIZER_SCALER_FILE: &str = "fertilizer_scaler.json";

/// Locations of the four artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub crop_model: PathBuf,
    pub crop_scaler: PathBuf,
    pub fertilizer_model: PathBuf,
    pub fertilizer_scaler: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside a model directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            crop_model: dir.join(CROP_MODEL_FILE),
            crop_scaler: dir.join(CROP_SCALER_FILE),
            fertilizer_model: dir.join(FERTILIZER_MODEL_FILE),
            fertilizer_scaler: dir.join(FERTILIZER_SCALER_FILE),
        }
    }

    pub fn model(&self, domain: Domain) -> &Path {
        match domain {
            Domain::Crop => &self.crop_model,
            Domain::Fertilizer => &self.fertilizer_model,
        }
    }

    pub fn scaler(&self, domain: Domain) -> &Path {
        match domain {
            Domain::Crop => &self.crop_scaler,
            Domain::Fertilizer => &self.fertilizer_scaler,
        }
    }
}

/// Load a classifier, choosing the format by file extension.
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    match extension(path).as_deref() {
        Some("json") => Ok(Box::new(JsonClassifier::load(path)?)),
        Some("onnx") => load_onnx(path),
        _ => Err(ArtifactError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load a scaler. Scalers are always JSON.
pub fn load_scaler(path: &Path) -> Result<Box<dyn Scaler>, ArtifactError> {
    match extension(path).as_deref() {
        Some("json") => Ok(Box::new(FittedScaler::load(path)?)),
        _ => Err(ArtifactError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    Ok(Box::new(crate::onnx::OnnxClassifier::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    Err(ArtifactError::OnnxDisabled(path.to_path_buf()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// A validated classifier + scaler pair for one domain.
pub struct DomainArtifacts {
    domain: Domain,
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl DomainArtifacts {
    /// Pair already-constructed artifacts, checking each is internally
    /// consistent and both take the domain's feature count.
    pub fn new(
        domain: Domain,
        scaler: Box<dyn Scaler>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        let expected = domain.feature_count();

        scaler.validate().map_err(|reason| ArtifactError::Malformed {
            domain,
            role: "scaler",
            reason,
        })?;
        classifier.validate().map_err(|reason| ArtifactError::Malformed {
            domain,
            role: "classifier",
            reason,
        })?;

        if scaler.n_features() != expected {
            return Err(ArtifactError::FeatureCount {
                domain,
                role: "scaler",
                expected,
                actual: scaler.n_features(),
            });
        }
        if let Some(actual) = classifier.n_features()
            && actual != expected
        {
            return Err(ArtifactError::FeatureCount {
                domain,
                role: "classifier",
                expected,
                actual,
            });
        }

        Ok(Self {
            domain,
            scaler,
            classifier,
        })
    }

    /// Load one domain's pair from `paths`.
    pub fn load(domain: Domain, paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let classifier = load_classifier(paths.model(domain))?;
        let scaler = load_scaler(paths.scaler(domain))?;
        let artifacts = Self::new(domain, scaler, classifier)?;

        info!(
            domain = %domain,
            classifier = artifacts.classifier.kind(),
            scaler = artifacts.scaler.kind(),
            "loaded artifact pair"
        );
        Ok(artifacts)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

/// Both domains' artifacts.
pub struct ArtifactStore {
    crop: DomainArtifacts,
    fertilizer: DomainArtifacts,
}

impl ArtifactStore {
    pub fn new(crop: DomainArtifacts, fertilizer: DomainArtifacts) -> Result<Self, ArtifactError> {
        for (expected, artifacts) in [(Domain::Crop, &crop), (Domain::Fertilizer, &fertilizer)] {
            if artifacts.domain != expected {
                return Err(ArtifactError::DomainMismatch {
                    expected,
                    actual: artifacts.domain,
                });
            }
        }
        Ok(Self { crop, fertilizer })
    }

    /// Load all four artifacts. Any missing or invalid artifact fails the
    /// whole load.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let crop = DomainArtifacts::load(Domain::Crop, paths)?;
        let fertilizer = DomainArtifacts::load(Domain::Fertilizer, paths)?;
        Self::new(crop, fertilizer)
    }

    pub fn get(&self, domain: Domain) -> &DomainArtifacts {
        match domain {
            Domain::Crop => &self.crop,
            Domain::Fertilizer => &self.fertilizer,
        }
    }

    pub(crate) fn into_parts(self) -> (DomainArtifacts, DomainArtifacts) {
        (self.crop, self.fertilizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CROP_SCALER: &str =
        r#"{"kind": "standard", "mean": [0, 0, 0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1, 1, 1]}"#;
    const CROP_MODEL: &str = r#"{
        "kind": "nearest_centroid",
        "classes": [1, 2],
        "centroids": [[0, 0, 0, 0, 0, 0, 0], [1, 1, 1, 1, 1, 1, 1]]
    }"#;
    const FERTILIZER_SCALER: &str = r#"{"kind": "identity", "n_features": 8}"#;
    const FERTILIZER_MODEL: &str = r#"{
        "kind": "linear",
        "classes": [1, 2],
        "coefficients": [[1, 0, 0, 0, 0, 0, 0, 0]],
        "intercepts": [0]
    }"#;

    fn json_paths(dir: &TempDir) -> ArtifactPaths {
        ArtifactPaths {
            crop_model: dir.path().join("crop.json"),
            crop_scaler: dir.path().join("crop_scaler.json"),
            fertilizer_model: dir.path().join("fertilizer.json"),
            fertilizer_scaler: dir.path().join("fertilizer_scaler.json"),
        }
    }

    fn write_all(paths: &ArtifactPaths) {
        std::fs::write(&paths.crop_model, CROP_MODEL).unwrap();
        std::fs::write(&paths.crop_scaler, CROP_SCALER).unwrap();
        std::fs::write(&paths.fertilizer_model, FERTILIZER_MODEL).unwrap();
        std::fs::write(&paths.fertilizer_scaler, FERTILIZER_SCALER).unwrap();
    }

    #[test]
    fn default_paths_in_dir() {
        let paths = ArtifactPaths::in_dir(Path::new("models"));
        assert_eq!(paths.model(Domain::Crop), Path::new("models/crop.onnx"));
        assert_eq!(
            paths.scaler(Domain::Fertilizer),
            Path::new("models/fertilizer_scaler.json")
        );
    }

    #[test]
    fn load_store_from_json_artifacts() {
        let dir = TempDir::new().unwrap();
        let paths = json_paths(&dir);
        write_all(&paths);

        let store = ArtifactStore::load(&paths).unwrap();
        assert_eq!(store.get(Domain::Crop).classifier().kind(), "nearest_centroid");
        assert_eq!(store.get(Domain::Fertilizer).scaler().kind(), "identity");
        assert_eq!(store.get(Domain::Fertilizer).domain(), Domain::Fertilizer);
    }

    #[test]
    fn any_missing_artifact_fails_the_store() {
        let dir = TempDir::new().unwrap();
        let paths = json_paths(&dir);
        write_all(&paths);
        std::fs::remove_file(&paths.fertilizer_scaler).unwrap();

        let err = ArtifactStore::load(&paths).err().unwrap();
        match err {
            ArtifactError::NotFound(p) => assert_eq!(p, paths.fertilizer_scaler),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn pairs_load_independently() {
        let dir = TempDir::new().unwrap();
        let paths = json_paths(&dir);
        write_all(&paths);
        std::fs::remove_file(&paths.fertilizer_model).unwrap();

        let crop = DomainArtifacts::load(Domain::Crop, &paths).unwrap();
        assert_eq!(crop.domain(), Domain::Crop);
        assert!(DomainArtifacts::load(Domain::Fertilizer, &paths).is_err());
    }

    #[test]
    fn scaler_feature_count_must_match_domain() {
        let dir = TempDir::new().unwrap();
        let paths = json_paths(&dir);
        write_all(&paths);
        // Crop-shaped scaler in the fertilizer slot.
        std::fs::write(&paths.fertilizer_scaler, CROP_SCALER).unwrap();

        let err = DomainArtifacts::load(Domain::Fertilizer, &paths).err().unwrap();
        match err {
            ArtifactError::FeatureCount {
                role,
                expected,
                actual,
                ..
            } => {
                assert_eq!(role, "scaler");
                assert_eq!(expected, 8);
                assert_eq!(actual, 7);
            }
            other => panic!("expected FeatureCount, got {other:?}"),
        }
    }

    #[test]
    fn classifier_feature_count_must_match_domain() {
        let dir = TempDir::new().unwrap();
        let paths = json_paths(&dir);
        write_all(&paths);
        std::fs::write(&paths.crop_model, FERTILIZER_MODEL).unwrap();

        let err = DomainArtifacts::load(Domain::Crop, &paths).err().unwrap();
        assert!(matches!(
            err,
            ArtifactError::FeatureCount {
                role: "classifier",
                ..
            }
        ));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_classifier(Path::new("models/crop.pkl")).err().unwrap();
        assert!(matches!(err, ArtifactError::UnsupportedFormat(_)));
        let err = load_scaler(Path::new("models/crop_scaler.onnx")).err().unwrap();
        assert!(matches!(err, ArtifactError::UnsupportedFormat(_)));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_model_without_onnx_feature() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crop.onnx");
        std::fs::write(&path, b"onnx bytes").unwrap();
        let err = load_classifier(&path).err().unwrap();
        assert!(matches!(err, ArtifactError::OnnxDisabled(_)));
    }

    #[test]
    fn hand_built_artifacts_are_validated() {
        let uneven = FittedScaler::Standard {
            mean: vec![0.0; 7],
            scale: vec![1.0; 3],
        };
        let model = JsonClassifier::NearestCentroid {
            classes: vec![1, 2],
            centroids: vec![vec![0.0; 7], vec![1.0; 7]],
        };
        let err = DomainArtifacts::new(Domain::Crop, Box::new(uneven), Box::new(model.clone()))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ArtifactError::Malformed {
                domain: Domain::Crop,
                role: "scaler",
                ..
            }
        ));

        let no_intercepts = JsonClassifier::Linear {
            classes: vec![1, 2],
            coefficients: vec![vec![1.0; 7]],
            intercepts: vec![],
        };
        let scaler = FittedScaler::Identity { n_features: 7 };
        let err = DomainArtifacts::new(Domain::Crop, Box::new(scaler.clone()), Box::new(no_intercepts))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ArtifactError::Malformed {
                role: "classifier",
                ..
            }
        ));

        assert!(DomainArtifacts::new(Domain::Crop, Box::new(scaler), Box::new(model)).is_ok());
    }

    #[test]
    fn store_rejects_swapped_pairs() {
        let dir = TempDir::new().unwrap();
        let paths = json_paths(&dir);
        write_all(&paths);

        let crop = DomainArtifacts::load(Domain::Crop, &paths).unwrap();
        let fertilizer = DomainArtifacts::load(Domain::Fertilizer, &paths).unwrap();
        let err = ArtifactStore::new(fertilizer, crop).err().unwrap();
        assert!(matches!(
            err,
            ArtifactError::DomainMismatch {
                expected: Domain::Crop,
                actual: Domain::Fertilizer
            }
        ));
    }
}
