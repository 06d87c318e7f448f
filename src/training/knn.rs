//! K-Nearest Neighbors regression

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::models::Regressor;
use crate::error::{PredictorError, Result};

/// K-Nearest Neighbors Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNRegressor {
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KNNRegressor {
    /// Create an unfitted regressor averaging the `n_neighbors` closest rows
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    /// Fit the regressor (stores training data)
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PredictorError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_neighbors == 0 {
            return Err(PredictorError::InvalidParameter {
                name: "n_neighbors".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Predict target values (parallelized over test samples)
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(xt), Some(yt)) => (xt, yt),
            _ => return Err(PredictorError::ModelNotFitted),
        };
        if x.ncols() != x_train.ncols() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", x_train.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let k = self.n_neighbors;

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row: Vec<f64> = x.row(i).to_vec();
                let neighbors = find_k_nearest(&row, x_train, y_train, k);
                neighbors.iter().map(|(_, y)| y).sum::<f64>() / neighbors.len() as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

impl Regressor for KNNRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        KNNRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        KNNRegressor::predict(self, x)
    }

    fn name(&self) -> &'static str {
        "knn"
    }
}

/// Max-heap entry for partial sort (keeps k smallest distances)
#[derive(PartialEq)]
struct DistLabel(f64, f64);

impl Eq for DistLabel {}

impl PartialOrd for DistLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// Find k nearest neighbors using a max-heap, O(n log k)
fn find_k_nearest(
    point: &[f64],
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = euclidean(point, row.iter().copied());
        if heap.len() < k {
            heap.push(DistLabel(dist, y_train[i]));
        } else if let Some(top) = heap.peek() {
            if dist < top.0 {
                heap.pop();
                heap.push(DistLabel(dist, y_train[i]));
            }
        }
    }

    heap.into_iter().map(|dl| (dl.0, dl.1)).collect()
}

fn euclidean(a: &[f64], b: impl Iterator<Item = f64>) -> f64 {
    a.iter().zip(b).map(|(ai, bi)| (ai - bi).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_knn_regressor_uniform() {
        let x = array![[0.0], [1.0], [2.0], [10.0], [11.0]];
        let y = array![1.0, 2.0, 3.0, 10.0, 20.0];

        let mut knn = KNNRegressor::new(3);
        knn.fit(&x, &y).unwrap();

        let pred = knn.predict(&array![[1.0]]).unwrap();
        assert!((pred[0] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_neighbors_by_euclidean_distance() {
        let x = array![[0.0, 0.0], [3.0, 4.0], [1.0, 1.0], [10.0, 10.0]];
        let y = array![4.0, 100.0, 8.0, 50.0];

        let mut knn = KNNRegressor::new(2);
        knn.fit(&x, &y).unwrap();

        // (0, 0) and (1, 1) are the two closest rows
        let pred = knn.predict(&array![[0.5, 0.4]]).unwrap();
        assert!((pred[0] - 6.0).abs() < 1e-10);
        assert_eq!(euclidean(&[0.0, 0.0], [3.0, 4.0].into_iter()), 5.0);
    }

    #[test]
    fn test_predict_before_fit() {
        let knn = KNNRegressor::new(3);
        assert!(matches!(knn.predict(&array![[1.0]]), Err(PredictorError::ModelNotFitted)));
    }

    #[test]
    fn test_zero_neighbors_rejected() {
        let mut knn = KNNRegressor::new(0);
        assert!(knn.fit(&array![[1.0]], &array![1.0]).is_err());
    }
}
