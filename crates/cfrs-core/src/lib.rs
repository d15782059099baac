pub mod category;
pub mod domain;
pub mod error;
pub mod features;
pub mod labels;
pub mod schema;

pub use category::CategoryKind;
pub use domain::{Domain, ParseDomainError};
pub use error::EncodeError;
pub use features::{CropMeasurements, FertilizerMeasurements};
pub use labels::{Decoded, LabelTable};
pub use schema::tabular;
