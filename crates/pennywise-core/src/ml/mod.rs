//! Learning algorithms
//!
//! - `forest` - bagged regression trees for spending prediction
//! - `isolation` - isolation forest for anomaly scoring
//! - `trend` - linear trend model and least-squares slopes
//! - `metrics` - regression error metrics

pub mod forest;
pub mod isolation;
pub mod metrics;
pub mod trend;

pub use forest::{ForestParams, RandomForestRegressor};
pub use isolation::IsolationForest;
pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error};
pub use trend::{linear_slope, TrendModel};

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Convert an ndarray matrix to smartcore's row-major dense matrix
pub(crate) fn to_dense(x: &Array2<f64>) -> DenseMatrix<f64> {
    let (rows, cols) = x.dim();
    let data: Vec<f64> = x.iter().copied().collect();
    DenseMatrix::new(rows, cols, data, false)
}

/// Shuffle row indices and split them into (train, test)
///
/// The test side gets `ceil(n * test_size)` rows, and both sides keep at
/// least one row when `n >= 2`.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut n_test = (n as f64 * test_size).ceil() as usize;
    if n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    } else {
        n_test = 0;
    }

    let train = indices.split_off(n_test);
    (train, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(100, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_seeded() {
        assert_eq!(train_test_split(50, 0.2, 1), train_test_split(50, 0.2, 1));
        assert_ne!(train_test_split(50, 0.2, 1), train_test_split(50, 0.2, 2));
    }

    #[test]
    fn test_split_keeps_both_sides() {
        let (train, test) = train_test_split(3, 0.0, 42);
        assert_eq!(train.len(), 2);
        assert_eq!(test.len(), 1);
    }

    #[test]
    fn test_to_dense_is_row_major() {
        use smartcore::linalg::basic::arrays::Array;

        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let dense = to_dense(&x);
        assert_eq!(*dense.get((0, 1)), 2.0);
        assert_eq!(*dense.get((1, 0)), 3.0);
    }
}
