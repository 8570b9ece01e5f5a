//! Isolation forest anomaly detection
//!
//! Anomalies are few and different, so random axis-aligned splits isolate them
//! in fewer steps than normal points. Each tree is grown on a subsample of at
//! most 256 rows up to depth `ceil(log2(subsample))`; a point's score is
//! `-2^(-E[h(x)] / c(subsample))`, so lower scores are more anomalous.
//!
//! The decision threshold (`offset`) is the `contamination` percentile of the
//! training scores: roughly that share of training rows scores below it.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::metrics::percentile;
use crate::error::{Error, Result};

const MAX_SAMPLES: usize = 256;

/// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Offset used when contamination is zero
const DEFAULT_OFFSET: f64 = -0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful BST search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<Node>,
    max_samples: usize,
    offset: f64,
    n_features: usize,
}

impl IsolationForest {
    pub fn fit(
        x: &Array2<f64>,
        n_estimators: usize,
        contamination: f64,
        seed: u64,
    ) -> Result<Self> {
        let n_rows = x.nrows();
        if n_rows < 2 {
            return Err(Error::Training(
                "isolation forest needs at least 2 rows".into(),
            ));
        }

        let max_samples = n_rows.min(MAX_SAMPLES);
        let max_depth = (max_samples as f64).log2().ceil().max(1.0) as usize;
        let mut rng = StdRng::seed_from_u64(seed);

        let trees = (0..n_estimators)
            .map(|_| {
                let rows = sample(&mut rng, n_rows, max_samples).into_vec();
                build(x, rows, 0, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            max_samples,
            offset: DEFAULT_OFFSET,
            n_features: x.ncols(),
        };

        if contamination > 0.0 {
            let scores: Vec<f64> = x.rows().into_iter().map(|r| forest.score(r)).collect();
            forest.offset = percentile(&scores, contamination * 100.0);
        }

        Ok(forest)
    }

    /// Score threshold separating inliers from outliers
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Anomaly score in [-1, 0); lower is more anomalous
    pub fn score_samples(&self, row: &[f64]) -> Result<f64> {
        self.check_width(row.len())?;
        Ok(self.score(ArrayView1::from(row)))
    }

    /// Score shifted by the offset; negative means outlier
    pub fn decision_function(&self, row: &[f64]) -> Result<f64> {
        Ok(self.score_samples(row)? - self.offset)
    }

    /// `-1` for outliers, `1` for inliers
    pub fn predict(&self, row: &[f64]) -> Result<i8> {
        Ok(if self.decision_function(row)? < 0.0 {
            -1
        } else {
            1
        })
    }

    fn score(&self, row: ArrayView1<'_, f64>) -> f64 {
        if self.trees.is_empty() {
            return DEFAULT_OFFSET;
        }
        let mean_depth = self
            .trees
            .iter()
            .map(|tree| path_length(tree, &row, 0))
            .sum::<f64>()
            / self.trees.len() as f64;

        let norm = average_path_length(self.max_samples);
        if norm == 0.0 {
            return DEFAULT_OFFSET;
        }
        -(2f64.powf(-mean_depth / norm))
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.n_features {
            return Err(Error::Model(format!(
                "isolation forest expects {} features, got {}",
                self.n_features, width
            )));
        }
        Ok(())
    }
}

fn build(
    x: &Array2<f64>,
    rows: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= max_depth || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    // Only features that still vary among these rows can split them
    let candidates: Vec<(usize, f64, f64)> = (0..x.ncols())
        .filter_map(|f| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                let v = x[[r, f]];
                (lo.min(v), hi.max(v))
            });
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        return Node::Leaf { size: rows.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);

    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| x[[r, feature]] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build(x, left, depth + 1, max_depth, rng)),
        right: Box::new(build(x, right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, row: &ArrayView1<'_, f64>, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tight grid around the origin plus one far-away point
    fn clustered_with_outlier() -> Array2<f64> {
        let mut rows: Vec<f64> = Vec::new();
        for i in 0..20 {
            for j in 0..10 {
                rows.push(i as f64 * 0.1);
                rows.push(j as f64 * 0.1);
            }
        }
        rows.push(50.0);
        rows.push(50.0);
        Array2::from_shape_vec((201, 2), rows).unwrap()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) is about 10.24
        assert!((average_path_length(256) - 10.24).abs() < 0.01);
    }

    #[test]
    fn test_outlier_scores_lower() {
        let x = clustered_with_outlier();
        let forest = IsolationForest::fit(&x, 100, 0.1, 42).unwrap();

        let outlier = forest.score_samples(&[50.0, 50.0]).unwrap();
        let inlier = forest.score_samples(&[1.0, 0.5]).unwrap();
        assert!(outlier < inlier);
        assert_eq!(forest.predict(&[50.0, 50.0]).unwrap(), -1);
        assert_eq!(forest.predict(&[1.0, 0.5]).unwrap(), 1);
    }

    #[test]
    fn test_contamination_share() {
        let x = clustered_with_outlier();
        let forest = IsolationForest::fit(&x, 50, 0.1, 7).unwrap();

        let flagged = x
            .rows()
            .into_iter()
            .filter(|r| forest.predict(&r.to_vec()).unwrap() == -1)
            .count();
        // About 10% of 201 rows, allowing for ties at the threshold
        assert!(flagged <= 25, "flagged {}", flagged);
        assert!(flagged >= 1);
    }

    #[test]
    fn test_scores_in_range() {
        let x = clustered_with_outlier();
        let forest = IsolationForest::fit(&x, 20, 0.1, 1).unwrap();
        for r in x.rows() {
            let s = forest.score_samples(&r.to_vec()).unwrap();
            assert!((-1.0..0.0).contains(&s));
        }
    }

    #[test]
    fn test_zero_contamination_uses_default_offset() {
        let x = clustered_with_outlier();
        let forest = IsolationForest::fit(&x, 10, 0.0, 1).unwrap();
        assert_eq!(forest.offset(), DEFAULT_OFFSET);
    }

    #[test]
    fn test_too_few_rows() {
        let x = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        assert!(IsolationForest::fit(&x, 10, 0.1, 1).is_err());
    }

    #[test]
    fn test_width_mismatch() {
        let x = clustered_with_outlier();
        let forest = IsolationForest::fit(&x, 5, 0.1, 1).unwrap();
        assert!(forest.score_samples(&[1.0]).is_err());
    }
}
