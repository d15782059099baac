//! Recommendation domains and their fixed feature layouts.
//!
//! Each domain pins the order of its feature vector. The order matches the
//! column order the models were trained on; reordering does not fail, it
//! silently produces wrong predictions, so every encoder and schema in the
//! workspace derives its layout from [`Domain::feature_names`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::labels::{CROP_LABELS, FERTILIZER_LABELS, LabelTable};

/// Crop feature order: N, P, K, temperature, humidity, ph, rainfall.
pub const CROP_FEATURES: [&str; 7] = ["n", "p", "k", "temperature", "humidity", "ph", "rainfall"];

/// Fertilizer feature order. Soil and crop type are integer category codes.
pub const FERTILIZER_FEATURES: [&str; 8] = [
    "temperature",
    "humidity",
    "moisture",
    "soil_type",
    "crop_type",
    "nitrogen",
    "potassium",
    "phosphorous",
];

/// Which recommendation pipeline a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Crop,
    Fertilizer,
}

#[derive(Debug, Error)]
#[error("unknown domain {0:?} (expected \"crop\" or \"fertilizer\")")]
pub struct ParseDomainError(String);

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Crop, Domain::Fertilizer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Fertilizer => "fertilizer",
        }
    }

    /// Feature names in model input order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        match self {
            Self::Crop => &CROP_FEATURES,
            Self::Fertilizer => &FERTILIZER_FEATURES,
        }
    }

    /// Length of the feature vector the domain's models expect.
    pub fn feature_count(&self) -> usize {
        self.feature_names().len()
    }

    /// Label lookup table for decoding classifier output.
    pub fn labels(&self) -> LabelTable {
        match self {
            Self::Crop => LabelTable::new(CROP_LABELS, "Unknown Crop"),
            Self::Fertilizer => LabelTable::new(FERTILIZER_LABELS, "Unknown Fertilizer"),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ParseDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crop" => Ok(Self::Crop),
            "fertilizer" | "fertiliser" => Ok(Self::Fertilizer),
            _ => Err(ParseDomainError(s.to_string())),
        }
    }
}
