//! Reference dataset loading

use crate::error::{PredictorError, Result};
use crate::features::{InputField, RangeTable, Shape, ValidatedInput, SHAPE_COLUMN, TARGET_COLUMNS};
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Data loader for the collector measurement file
pub struct DataLoader {
    /// Rows used for schema inference
    infer_schema_length: usize,
    /// Field separator
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 100,
            separator: b',',
        }
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref())?;

        let parse_opts = CsvParseOptions::default().with_separator(self.separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PredictorError::DataError(e.to_string()))
    }

    /// Load and decode the reference dataset
    pub fn load_dataset(&self, path: impl AsRef<Path>) -> Result<SolarDataset> {
        let path = path.as_ref();
        let df = self.load_csv(path)?;
        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = ?df.get_column_names(),
            "Dataset loaded"
        );
        SolarDataset::from_dataframe(&df)
    }
}

/// Decoded training rows: validated inputs plus the three targets
#[derive(Debug, Clone)]
pub struct SolarDataset {
    rows: Vec<ValidatedInput>,
    targets: Array2<f64>,
    dropped_rows: usize,
}

impl SolarDataset {
    /// Decode a dataframe holding the shape, input and target columns.
    ///
    /// Rows with an unknown shape or a missing value in any used column are
    /// skipped and counted.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let shapes = string_column(df, SHAPE_COLUMN)?;
        let inputs: Vec<Vec<Option<f64>>> = InputField::ALL
            .iter()
            .map(|f| numeric_column(df, f.column()))
            .collect::<Result<_>>()?;
        let targets: Vec<Vec<Option<f64>>> = TARGET_COLUMNS
            .iter()
            .map(|c| numeric_column(df, c))
            .collect::<Result<_>>()?;

        let mut rows = Vec::with_capacity(df.height());
        let mut target_values = Vec::with_capacity(df.height() * TARGET_COLUMNS.len());
        let mut dropped_rows = 0;

        for i in 0..df.height() {
            let shape = shapes[i].as_deref().and_then(|name| Shape::from_name(name.trim()).ok());
            let values: Option<Vec<f64>> = inputs.iter().map(|col| col[i]).collect();
            let row_targets: Option<Vec<f64>> = targets.iter().map(|col| col[i]).collect();

            match (shape, values, row_targets) {
                (Some(shape), Some(values), Some(row_targets)) => {
                    let values: [f64; InputField::ALL.len()] = values
                        .try_into()
                        .map_err(|_| PredictorError::DataError("input width mismatch".to_string()))?;
                    rows.push(ValidatedInput::new(shape, values));
                    target_values.extend(row_targets);
                }
                _ => dropped_rows += 1,
            }
        }

        if dropped_rows > 0 {
            warn!(dropped_rows, "Skipped dataset rows with unknown shape or missing values");
        }

        if rows.is_empty() {
            return Err(PredictorError::DataError("dataset has no usable rows".to_string()));
        }

        let targets = Array2::from_shape_vec((rows.len(), TARGET_COLUMNS.len()), target_values)?;

        Ok(Self {
            rows,
            targets,
            dropped_rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ValidatedInput] {
        &self.rows
    }

    /// Target matrix, one column per entry of `TARGET_COLUMNS`
    pub fn targets(&self) -> &Array2<f64> {
        &self.targets
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// All values of one input field
    pub fn field_values(&self, field: InputField) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(field)).collect()
    }

    /// Observed (min, max) of every input field
    pub fn range_table(&self) -> Result<RangeTable> {
        let columns: Vec<(InputField, Vec<f64>)> = InputField::ALL
            .iter()
            .map(|&field| (field, self.field_values(field)))
            .collect();
        RangeTable::from_columns(columns.iter().map(|(f, v)| (*f, v.as_slice())))
    }

    /// Feature matrix laid out by `feature_columns`
    pub fn feature_matrix(&self, feature_columns: &[String]) -> Result<Array2<f64>> {
        let mut flat = Vec::with_capacity(self.rows.len() * feature_columns.len());
        for row in &self.rows {
            flat.extend(row.assemble(feature_columns)?);
        }
        Ok(Array2::from_shape_vec((self.rows.len(), feature_columns.len()), flat)?)
    }
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PredictorError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PredictorError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}
