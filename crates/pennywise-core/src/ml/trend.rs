//! Linear trend fitting

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};

use super::to_dense;
use crate::error::{Error, Result};

type Linear = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Ordinary least squares over `[month, user_income, user_age]`
#[derive(Serialize, Deserialize)]
pub struct TrendModel {
    model: Linear,
    n_features: usize,
}

impl std::fmt::Debug for TrendModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendModel")
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl TrendModel {
    pub fn fit(x: &Array2<f64>, y: &[f64]) -> Result<Self> {
        if x.nrows() <= x.ncols() {
            return Err(Error::Training(format!(
                "trend model needs more rows than features ({} <= {})",
                x.nrows(),
                x.ncols()
            )));
        }
        let model = Linear::fit(&to_dense(x), &y.to_vec(), LinearRegressionParameters::default())?;
        Ok(Self {
            model,
            n_features: x.ncols(),
        })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        if x.ncols() != self.n_features {
            return Err(Error::Model(format!(
                "trend model expects {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(self.model.predict(&to_dense(x))?)
    }
}

/// Least-squares slope of `ys` against their index `0..n`
///
/// Fewer than two points have no trend and give 0.
pub fn linear_slope(ys: &[f64]) -> f64 {
    let n = ys.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (num, den) = ys
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });

    num / den
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope() {
        assert_eq!(linear_slope(&[]), 0.0);
        assert_eq!(linear_slope(&[5.0]), 0.0);
        assert!((linear_slope(&[1.0, 3.0, 5.0]) - 2.0).abs() < 1e-12);
        assert!((linear_slope(&[10.0, 8.0]) + 2.0).abs() < 1e-12);
        assert!(linear_slope(&[3.0, 3.0, 3.0]).abs() < 1e-12);
    }

    #[test]
    fn test_fit_recovers_plane() {
        // y = 2*a + 0.5*b - c + 3
        let rows: Vec<[f64; 3]> = (0..30)
            .map(|i| {
                let i = i as f64;
                [i % 12.0 + 1.0, 3000.0 + 97.0 * i, 20.0 + (i * 7.0) % 40.0]
            })
            .collect();
        let y: Vec<f64> = rows
            .iter()
            .map(|r| 2.0 * r[0] + 0.5 * r[1] - r[2] + 3.0)
            .collect();
        let x = Array2::from_shape_vec((30, 3), rows.concat()).unwrap();

        let model = TrendModel::fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert!((p - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_too_few_rows() {
        let x = Array2::from_shape_vec((2, 3), vec![1.0; 6]).unwrap();
        assert!(TrendModel::fit(&x, &[1.0, 2.0]).is_err());
    }
}
