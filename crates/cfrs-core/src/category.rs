//! Category code tables for the fertilizer model's categorical inputs.
//!
//! The fertilizer model was trained on integer-encoded soil and crop types.
//! Names are matched exactly as listed; anything else is an
//! [`EncodeError::UnknownCategory`].

use std::fmt;

use crate::error::EncodeError;

/// Soil type name → training code.
pub const SOIL_TYPE_CODES: &[(&str, i64)] = &[("Sandy", 1), ("Loamy", 2), ("Clayey", 3)];

/// Crop type name → training code.
pub const CROP_TYPE_CODES: &[(&str, i64)] = &[("Rice", 1), ("Maize", 2), ("Wheat", 3)];

/// Which category table a name is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    SoilType,
    CropType,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 2] = [Self::SoilType, Self::CropType];

    pub fn table(&self) -> &'static [(&'static str, i64)] {
        match self {
            Self::SoilType => SOIL_TYPE_CODES,
            Self::CropType => CROP_TYPE_CODES,
        }
    }

    /// Accepted names, in code order.
    pub fn names(&self) -> Vec<&'static str> {
        self.table().iter().map(|(name, _)| *name).collect()
    }

    /// Resolve a name to its integer code.
    pub fn code(&self, name: &str) -> Result<i64, EncodeError> {
        self.table()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| *code)
            .ok_or_else(|| EncodeError::UnknownCategory {
                kind: *self,
                name: name.to_string(),
            })
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SoilType => "soil type",
            Self::CropType => "crop type",
        })
    }
}
