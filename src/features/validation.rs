//! Range table, request validation and feature assembly

use serde::{Deserialize, Serialize};

use super::schema::{FieldValue, InputField, PredictRequest, SHAPE_CODE_COLUMN};
use super::shape::Shape;
use crate::error::{PredictorError, Result};

/// Client-side input errors; all map to HTTP 400
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing value for {0}")]
    MissingField(String),

    #[error("{field} must be a number, got {value}")]
    InvalidNumber { field: String, value: String },

    #[error("{field} should be between {} and {}", bound(.min), bound(.max))]
    OutOfRange { field: String, min: f64, max: f64 },

    #[error("Invalid shape {given:?}. Choose from [{}]", join(.choices))]
    InvalidShape { given: String, choices: Vec<&'static str> },
}

/// Round to two decimal places, exact ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn bound(value: &f64) -> f64 {
    round2(*value)
}

fn join(choices: &[&'static str]) -> String {
    choices.join(", ")
}

/// Observed bounds of one input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub field: InputField,
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Per-field (min, max) taken from the training data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    ranges: Vec<FeatureRange>,
}

impl RangeTable {
    /// Build from per-field column values
    pub fn from_columns<'a, I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (InputField, &'a [f64])>,
    {
        let mut ranges = Vec::new();
        for (field, values) in columns {
            let (min, max) = values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                    None => Some((v, v)),
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                })
                .ok_or_else(|| {
                    PredictorError::DataError(format!("column '{}' has no numeric values", field.column()))
                })?;
            ranges.push(FeatureRange {
                field,
                column: field.column().to_string(),
                min,
                max,
            });
        }
        Ok(Self { ranges })
    }

    pub fn get(&self, field: InputField) -> Option<&FeatureRange> {
        self.ranges.iter().find(|r| r.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Request values after every check has passed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub shape: Shape,
    values: [f64; InputField::ALL.len()],
}

impl ValidatedInput {
    /// Values must follow `InputField::ALL` order
    pub fn new(shape: Shape, values: [f64; InputField::ALL.len()]) -> Self {
        Self { shape, values }
    }

    pub fn value(&self, field: InputField) -> f64 {
        let idx = InputField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or_default();
        self.values[idx]
    }

    /// Order values by the given feature column list.
    ///
    /// The list comes from the fitted pipeline so serving uses the same
    /// layout that fitting used.
    pub fn assemble(&self, feature_columns: &[String]) -> Result<Vec<f64>> {
        feature_columns
            .iter()
            .map(|column| {
                if column == SHAPE_CODE_COLUMN {
                    Ok(f64::from(self.shape.code()))
                } else {
                    InputField::from_column(column)
                        .map(|field| self.value(field))
                        .ok_or_else(|| PredictorError::FeatureNotFound(column.clone()))
                }
            })
            .collect()
    }
}

/// Convert a raw JSON value to a finite float
pub fn parse_number(field: InputField, raw: &FieldValue) -> std::result::Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidNumber {
        field: field.key().to_string(),
        value: raw.to_string(),
    };
    let value = match raw {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        FieldValue::Other(_) => return Err(invalid()),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid())
    }
}

/// Check a single field against its recorded range
pub fn check_range(
    field: InputField,
    raw: Option<&FieldValue>,
    range: Option<&FeatureRange>,
) -> std::result::Result<f64, ValidationError> {
    let raw = raw.ok_or_else(|| ValidationError::MissingField(field.key().to_string()))?;
    let value = parse_number(field, raw)?;
    match range {
        Some(r) if !r.contains(value) => Err(ValidationError::OutOfRange {
            field: field.key().to_string(),
            min: r.min,
            max: r.max,
        }),
        _ => Ok(value),
    }
}

/// Validate a request: shape first, then every field in schema order
pub fn validate_request(
    request: &PredictRequest,
    ranges: &RangeTable,
) -> std::result::Result<ValidatedInput, ValidationError> {
    let shape = match &request.shape {
        None => return Err(ValidationError::MissingField("shape".to_string())),
        Some(FieldValue::Text(name)) => Shape::from_name(name)?,
        Some(other) => {
            return Err(ValidationError::InvalidShape {
                given: other.to_string(),
                choices: Shape::names(),
            })
        }
    };

    let mut values = [0.0; InputField::ALL.len()];
    for (slot, field) in values.iter_mut().zip(InputField::ALL) {
        *slot = check_range(field, request.field(field), ranges.get(field))?;
    }

    Ok(ValidatedInput { shape, values })
}
