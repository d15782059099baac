//! Feature encoding: named measurements → fixed-order feature vectors.
//!
//! Range validation belongs to whoever collects the measurements; the encoder
//! only orders values and resolves category names.

use serde::{Deserialize, Serialize};

use crate::category::CategoryKind;
use crate::error::EncodeError;

/// Soil and climate measurements for a crop recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropMeasurements {
    /// Nitrogen content ratio.
    pub n: f64,
    /// Phosphorus content ratio.
    pub p: f64,
    /// Potassium content ratio.
    pub k: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub ph: f64,
    /// Millimetres.
    pub rainfall: f64,
}

impl CropMeasurements {
    /// Encode as `[n, p, k, temperature, humidity, ph, rainfall]`.
    pub fn encode(&self) -> Vec<f64> {
        vec![
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

/// Soil, crop and nutrient measurements for a fertilizer recommendation.
///
/// `soil_type` and `crop_type` are names from the category code tables
/// (e.g. `"Loamy"`, `"Maize"`); they are resolved to codes during encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerMeasurements {
    pub temperature: f64,
    /// Fraction, e.g. 0.5.
    pub humidity: f64,
    /// Fraction, e.g. 0.6.
    pub moisture: f64,
    pub soil_type: String,
    pub crop_type: String,
    pub nitrogen: f64,
    pub potassium: f64,
    pub phosphorous: f64,
}

impl FertilizerMeasurements {
    /// Encode as `[temperature, humidity, moisture, soil_code, crop_code,
    /// nitrogen, potassium, phosphorous]`.
    ///
    /// Fails with [`EncodeError::UnknownCategory`] before any vector is built
    /// if either name is missing from its table.
    pub fn encode(&self) -> Result<Vec<f64>, EncodeError> {
        let soil_code = CategoryKind::SoilType.code(&self.soil_type)?;
        let crop_code = CategoryKind::CropType.code(&self.crop_type)?;

        Ok(vec![
            self.temperature,
            self.humidity,
            self.moisture,
            soil_code as f64,
            crop_code as f64,
            self.nitrogen,
            self.potassium,
            self.phosphorous,
        ])
    }
}
