//! Random forest regression
//!
//! Bootstrap-aggregated CART trees. Each tree sees all features and a
//! bootstrap resample of the rows; the forest predicts the mean of its trees.
//! Per-tree predictions are exposed so callers can measure ensemble spread.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use tracing::debug;

use super::metrics::mean_absolute_error;
use super::to_dense;
use crate::error::{Error, Result};

type Tree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Hyperparameters for the forest
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<u16>,
    pub seed: u64,
}

#[derive(Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<Tree>,
    n_features: usize,
}

impl std::fmt::Debug for RandomForestRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomForestRegressor")
            .field("n_trees", &self.trees.len())
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl RandomForestRegressor {
    pub fn fit(x: &Array2<f64>, y: &[f64], params: ForestParams) -> Result<Self> {
        let n_rows = x.nrows();
        if n_rows == 0 || n_rows != y.len() {
            return Err(Error::Training(format!(
                "forest needs matching non-empty inputs (rows={}, targets={})",
                n_rows,
                y.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_estimators);

        for i in 0..params.n_estimators {
            let sample: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let xb = to_dense(&x.select(Axis(0), &sample));
            let yb: Vec<f64> = sample.iter().map(|&j| y[j]).collect();

            let mut tree_params = DecisionTreeRegressorParameters::default();
            if let Some(depth) = params.max_depth {
                tree_params = tree_params.with_max_depth(depth);
            }

            trees.push(Tree::fit(&xb, &yb, tree_params)?);

            if (i + 1) % 25 == 0 {
                debug!(trees = i + 1, total = params.n_estimators, "Fitted forest trees");
            }
        }

        Ok(Self {
            trees,
            n_features: x.ncols(),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean prediction of all trees for each row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        self.check_width(x.ncols())?;
        let dense = to_dense(x);

        let mut sums = vec![0.0; x.nrows()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.predict(&dense)?) {
                *sum += p;
            }
        }

        let n = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }

    /// Each tree's prediction for a single row
    pub fn predict_per_tree(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_width(row.len())?;
        let dense = DenseMatrix::new(1, row.len(), row.to_vec(), false);

        self.trees
            .iter()
            .map(|tree| {
                let p = tree.predict(&dense)?;
                p.first()
                    .copied()
                    .ok_or_else(|| Error::Model("tree returned no prediction".into()))
            })
            .collect()
    }

    /// Permutation importance on held-out data, normalized to sum to 1
    ///
    /// Importance of a column is the increase in MAE after shuffling it.
    /// Columns whose shuffle does not hurt get 0.
    pub fn permutation_importance(
        &self,
        x: &Array2<f64>,
        y: &[f64],
        seed: u64,
    ) -> Result<Vec<f64>> {
        let baseline = mean_absolute_error(y, &self.predict(x)?);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut raw = Vec::with_capacity(x.ncols());
        for col in 0..x.ncols() {
            let mut shuffled = x.clone();
            let mut values: Vec<f64> = x.column(col).to_vec();
            values.shuffle(&mut rng);
            for (cell, v) in shuffled.column_mut(col).iter_mut().zip(values) {
                *cell = v;
            }
            let mae = mean_absolute_error(y, &self.predict(&shuffled)?);
            raw.push((mae - baseline).max(0.0));
        }

        let total: f64 = raw.iter().sum();
        if total > 0.0 {
            Ok(raw.into_iter().map(|v| v / total).collect())
        } else {
            Ok(raw)
        }
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.n_features {
            return Err(Error::Model(format!(
                "forest expects {} features, got {}",
                self.n_features, width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::metrics::r2_score;

    /// y = 10 * x0, x1 is noise-free but irrelevant
    fn linear_data(n: usize) -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                ((i * 7) % 5) as f64
            }
        });
        let y = (0..n).map(|i| 10.0 * i as f64).collect();
        (x, y)
    }

    fn params() -> ForestParams {
        ForestParams {
            n_estimators: 20,
            max_depth: None,
            seed: 42,
        }
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = linear_data(60);
        let forest = RandomForestRegressor::fit(&x, &y, params()).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let pred = forest.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.9);
    }

    #[test]
    fn test_per_tree_predictions() {
        let (x, y) = linear_data(60);
        let forest = RandomForestRegressor::fit(&x, &y, params()).unwrap();

        let row = [30.0, 0.0];
        let per_tree = forest.predict_per_tree(&row).unwrap();
        assert_eq!(per_tree.len(), 20);

        let mean = per_tree.iter().sum::<f64>() / per_tree.len() as f64;
        let single = Array2::from_shape_vec((1, 2), row.to_vec()).unwrap();
        let forest_pred = forest.predict(&single).unwrap()[0];
        assert!((mean - forest_pred).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = linear_data(40);
        let a = RandomForestRegressor::fit(&x, &y, params()).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, params()).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_width_mismatch() {
        let (x, y) = linear_data(20);
        let forest = RandomForestRegressor::fit(&x, &y, params()).unwrap();
        assert!(forest.predict_per_tree(&[1.0]).is_err());
    }

    #[test]
    fn test_permutation_importance_prefers_signal() {
        let (x, y) = linear_data(60);
        let forest = RandomForestRegressor::fit(&x, &y, params()).unwrap();
        let imp = forest.permutation_importance(&x, &y, 42).unwrap();

        assert_eq!(imp.len(), 2);
        assert!(imp[0] > imp[1]);
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
