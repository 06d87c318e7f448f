//! Standard feature scaling

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Column-wise z-score scaler: (x - mean) / std.
///
/// Fitted on the training matrix and persisted with the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl Scaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(|m| m.len())
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(PredictorError::DataError("cannot fit scaler on empty data".to_string()));
        }

        let (mean, std): (Vec<f64>, Vec<f64>) = x
            .axis_iter(Axis(1))
            .map(|col| {
                let mean = col.mean().unwrap_or(0.0);
                // Population std, zero-variance columns pass through unscaled
                let std = col.std(0.0);
                (mean, if std == 0.0 { 1.0 } else { std })
            })
            .unzip();

        self.mean = Some(Array1::from_vec(mean));
        self.std = Some(Array1::from_vec(std));
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(PredictorError::ModelNotFitted),
        };

        if x.ncols() != mean.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok((x - mean) / std)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0], [4.0, 10.0], [5.0, 10.0]];

        let mut scaler = Scaler::new();
        let result = scaler.fit_transform(&x).unwrap();

        let col = result.column(0);
        assert!(col.mean().unwrap().abs() < 1e-10); // Mean should be ~0
        assert!((col.std(0.0) - 1.0).abs() < 1e-10);

        // Constant column is centred but not divided by zero
        assert!(result.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_transform_replays_training_statistics() {
        let mut scaler = Scaler::new();
        scaler.fit(&array![[0.0], [2.0], [4.0]]).unwrap();

        // mean 2, population std sqrt(8/3)
        let scaled = scaler.transform(&array![[2.0], [6.0]]).unwrap();
        assert_eq!(scaled[[0, 0]], 0.0);
        assert!((scaled[[1, 0]] - 4.0 / (8.0f64 / 3.0).sqrt()).abs() < 1e-10);
        assert_eq!(scaler.n_features(), Some(1));
    }

    #[test]
    fn test_transform_requires_fit() {
        let scaler = Scaler::new();
        let err = scaler.transform(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, PredictorError::ModelNotFitted));
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let mut scaler = Scaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let err = scaler.transform(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, PredictorError::ShapeError { .. }));
    }
}
