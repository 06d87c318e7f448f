//! Request features
//!
//! Maps the external JSON payload onto the model's input layout:
//! - Shape name to integer code
//! - Request keys to dataset columns
//! - Range checks against the training data
//! - Feature vector assembly in fitted column order

mod schema;
mod shape;
mod validation;

pub use schema::{
    feature_columns, FieldValue, InputField, PredictRequest, SHAPE_CODE_COLUMN, SHAPE_COLUMN,
    TARGET_COLUMNS,
};
pub use shape::Shape;
pub use validation::{
    check_range, parse_number, round2, validate_request, FeatureRange, RangeTable,
    ValidatedInput, ValidationError,
};
