//! Recommendation engine: scale → predict → decode.
//!
//! One [`RecommendationEngine`] per domain, each owning its artifact pair and
//! label table. [`Recommender`] holds both and exposes the crop and fertilizer
//! entry points that encode measurements before handing them to an engine.

use std::fmt;

use cfrs_core::{CropMeasurements, Decoded, Domain, FertilizerMeasurements, LabelTable};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RecommendError;
use crate::store::{ArtifactStore, DomainArtifacts};

/// Decoded result of one recommendation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub domain: Domain,
    /// Raw classifier output.
    pub class_id: i64,
    /// Label, or the domain sentinel when `known` is false.
    pub label: &'static str,
    pub known: bool,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// Inference pipeline for a single domain.
pub struct RecommendationEngine {
    artifacts: DomainArtifacts,
    labels: LabelTable,
}

impl RecommendationEngine {
    pub fn new(artifacts: DomainArtifacts) -> Self {
        let labels = artifacts.domain().labels();
        Self { artifacts, labels }
    }

    pub fn domain(&self) -> Domain {
        self.artifacts.domain()
    }

    pub fn artifacts(&self) -> &DomainArtifacts {
        &self.artifacts
    }

    /// Run one encoded feature vector through the pipeline.
    ///
    /// The vector must have exactly the domain's feature count; anything else
    /// is an encoder/engine mismatch and fails with
    /// [`RecommendError::InvalidFeatureShape`]. A class id missing from the
    /// label table is not an error: it decodes to the domain sentinel.
    pub fn recommend(&self, features: &[f64]) -> Result<Recommendation, RecommendError> {
        let domain = self.domain();
        let expected = domain.feature_count();
        if features.len() != expected {
            return Err(RecommendError::InvalidFeatureShape {
                domain,
                expected,
                actual: features.len(),
            });
        }

        let scaled = self.artifacts.scaler().transform(features);
        let class_id = self
            .artifacts
            .classifier()
            .predict(&scaled)
            .map_err(|source| RecommendError::Inference { domain, source })?;

        let recommendation = match self.labels.decode(class_id) {
            Decoded::Known(label) => Recommendation {
                domain,
                class_id,
                label,
                known: true,
            },
            Decoded::Unknown(sentinel) => {
                warn!(domain = %domain, class_id, "classifier returned a class id with no label");
                Recommendation {
                    domain,
                    class_id,
                    label: sentinel,
                    known: false,
                }
            }
        };

        debug!(
            domain = %domain,
            class_id,
            label = recommendation.label,
            "recommendation"
        );
        Ok(recommendation)
    }
}

/// Crop and fertilizer engines behind the two public entry points.
pub struct Recommender {
    crop: RecommendationEngine,
    fertilizer: RecommendationEngine,
}

impl Recommender {
    pub fn new(store: ArtifactStore) -> Self {
        let (crop, fertilizer) = store.into_parts();
        Self {
            crop: RecommendationEngine::new(crop),
            fertilizer: RecommendationEngine::new(fertilizer),
        }
    }

    pub fn engine(&self, domain: Domain) -> &RecommendationEngine {
        match domain {
            Domain::Crop => &self.crop,
            Domain::Fertilizer => &self.fertilizer,
        }
    }

    /// Best crop for the given soil and climate.
    pub fn recommend_crop(
        &self,
        measurements: &CropMeasurements,
    ) -> Result<Recommendation, RecommendError> {
        self.crop.recommend(&measurements.encode())
    }

    /// Best fertilizer for the given soil, crop and nutrient levels.
    ///
    /// Unknown soil or crop type names fail with
    /// [`RecommendError::Encode`] before any inference runs.
    pub fn recommend_fertilizer(
        &self,
        measurements: &FertilizerMeasurements,
    ) -> Result<Recommendation, RecommendError> {
        let features = measurements.encode()?;
        self.fertilizer.recommend(&features)
    }
}
