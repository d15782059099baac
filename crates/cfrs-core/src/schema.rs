/// Arrow schemas for tabular recommendation requests and results.
pub mod tabular {
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use std::sync::Arc;

    use crate::Domain;

    pub const RECOMMENDATION: &str = "recommendation";
    pub const CLASS_ID: &str = "class_id";
    pub const RECOMMENDED_AT: &str = "recommended_at";

    /// Columns that carry category names rather than numbers.
    pub const CATEGORY_COLUMNS: &[&str] = &["soil_type", "crop_type"];

    pub fn is_category_column(name: &str) -> bool {
        CATEGORY_COLUMNS.contains(&name)
    }

    /// Schema for a table of requests in the given domain.
    ///
    /// One column per feature, in feature order. Category columns are Utf8
    /// names; everything else is Float64.
    pub fn request_schema(domain: Domain) -> Schema {
        let fields: Vec<Field> = domain
            .feature_names()
            .iter()
            .map(|&name| {
                let data_type = if is_category_column(name) {
                    DataType::Utf8
                } else {
                    DataType::Float64
                };
                Field::new(name, data_type, true)
            })
            .collect();
        Schema::new(fields)
    }

    /// Columns appended to each scored row.
    pub fn result_fields() -> Vec<Field> {
        vec![
            Field::new(RECOMMENDATION, DataType::Utf8, false),
            Field::new(CLASS_ID, DataType::Int64, false),
            Field::new(
                RECOMMENDED_AT,
                DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
                false,
            ),
        ]
    }

    /// Input schema followed by the result columns.
    pub fn result_schema(input: &Schema) -> Arc<Schema> {
        let mut fields: Vec<Field> = input.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields.extend(result_fields());
        Arc::new(Schema::new(fields))
    }
}
