use crate::common::*;
use crate::error::{ActResult, ActivityError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Something that scores how much each column of `x` explains `y`
pub trait ImportanceFit: Sync {
    /// * `x` - examples x predictors
    /// * `y` - response, one value per example
    /// * `seed` - random seed
    fn fit_importance(&self, x: &Mat, y: &[f32], seed: u64) -> ActResult<DVec>;
}

/// Random forest of CART regression trees with impurity importance
#[derive(Debug, Clone, Copy)]
pub struct RegressionForest {
    pub trees: usize,
    /// minimum number of examples on each side of a split
    pub min_leaf: usize,
    /// number of candidate predictors per node; `None` for `sqrt(p)`
    pub mtry: Option<usize>,
}

impl Default for RegressionForest {
    fn default() -> Self {
        Self {
            trees: DEFAULT_TREES,
            min_leaf: DEFAULT_MIN_LEAF,
            mtry: None,
        }
    }
}

impl RegressionForest {
    pub fn new(trees: usize, min_leaf: usize) -> Self {
        Self {
            trees,
            min_leaf,
            mtry: None,
        }
    }

    fn mtry(&self, p: usize) -> usize {
        let default = ((p as f64).sqrt().floor() as usize).max(1);
        self.mtry.unwrap_or(default).clamp(1, p.max(1))
    }
}

impl ImportanceFit for RegressionForest {
    /// Sum-of-squares decrease of the splits on each predictor,
    /// averaged over trees.
    ///
    /// Tree seeds come from one generator in tree order and the
    /// per-tree importances are added up in the same order, so the
    /// result does not depend on how many threads ran the trees.
    fn fit_importance(&self, x: &Mat, y: &[f32], seed: u64) -> ActResult<DVec> {
        let (n, p) = x.shape();

        if y.len() != n {
            return Err(ActivityError::DimensionMismatch {
                what: "forest predictors and response",
                left: n,
                right: y.len(),
            });
        }

        if self.trees == 0 {
            return Err(ActivityError::validation("need at least one tree"));
        }

        if n == 0 || p == 0 {
            return Ok(DVec::zeros(p));
        }

        let mtry = self.mtry(p);
        let min_leaf = self.min_leaf.max(1);

        let mut rng = StdRng::seed_from_u64(seed);
        let tree_seeds: Vec<u64> = (0..self.trees).map(|_| rng.random()).collect();

        let per_tree: Vec<Vec<f64>> = tree_seeds
            .par_iter()
            .map(|&s| {
                let tree = TreeGrower {
                    x,
                    y,
                    min_leaf,
                    mtry,
                };
                tree.grow(s)
            })
            .collect();

        let mut totals = vec![0_f64; p];
        for imp in per_tree.iter() {
            for (t, &v) in totals.iter_mut().zip(imp.iter()) {
                *t += v;
            }
        }

        let ntrees = self.trees as f64;
        Ok(DVec::from_iterator(
            p,
            totals.into_iter().map(|v| (v / ntrees).max(0.0) as f32),
        ))
    }
}

struct TreeGrower<'a> {
    x: &'a Mat,
    y: &'a [f32],
    min_leaf: usize,
    mtry: usize,
}

struct Split {
    feature: usize,
    threshold: f32,
    decrease: f64,
}

impl TreeGrower<'_> {
    /// Grow one tree on a bootstrap sample and return the impurity
    /// decrease accumulated per predictor
    fn grow(&self, seed: u64) -> Vec<f64> {
        let (n, p) = self.x.shape();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut importance = vec![0_f64; p];

        let boot: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

        let mut stack = vec![boot];

        while let Some(node) = stack.pop() {
            if node.len() < 2 * self.min_leaf || self.is_pure(&node) {
                continue;
            }

            let candidates = rand::seq::index::sample(&mut rng, p, self.mtry);

            let mut best: Option<Split> = None;
            for j in candidates.iter() {
                if let Some(split) = self.best_split(&node, j) {
                    if best.as_ref().map_or(true, |b| split.decrease > b.decrease) {
                        best = Some(split);
                    }
                }
            }

            let Some(split) = best else {
                continue;
            };

            importance[split.feature] += split.decrease;

            let (left, right): (Vec<usize>, Vec<usize>) = node
                .into_iter()
                .partition(|&r| self.x[(r, split.feature)] <= split.threshold);

            stack.push(right);
            stack.push(left);
        }

        importance
    }

    fn is_pure(&self, node: &[usize]) -> bool {
        let (s, s2) = node.iter().fold((0_f64, 0_f64), |(s, s2), &r| {
            let v = self.y[r] as f64;
            (s + v, s2 + v * v)
        });
        let sse = s2 - s * s / node.len() as f64;
        sse <= f64::EPSILON * s2.max(f64::MIN_POSITIVE)
    }

    /// Best threshold on predictor `j` with at least `min_leaf`
    /// examples on both sides; `None` if no split reduces the sum of
    /// squares.
    fn best_split(&self, node: &[usize], j: usize) -> Option<Split> {
        let n = node.len();
        let mut xy: Vec<(f32, f64)> = node
            .iter()
            .map(|&r| (self.x[(r, j)], self.y[r] as f64))
            .collect();
        xy.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total: f64 = xy.iter().map(|&(_, v)| v).sum();
        let baseline = total * total / n as f64;

        let mut best: Option<Split> = None;
        let mut left_sum = 0_f64;

        for k in 1..n {
            left_sum += xy[k - 1].1;

            if k < self.min_leaf || n - k < self.min_leaf || xy[k - 1].0 >= xy[k].0 {
                continue;
            }

            let right_sum = total - left_sum;
            let decrease = left_sum * left_sum / k as f64
                + right_sum * right_sum / (n - k) as f64
                - baseline;

            if decrease > best.as_ref().map_or(0.0, |b| b.decrease) {
                best = Some(Split {
                    feature: j,
                    threshold: xy[k - 1].0,
                    decrease,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y depends on column 0 only
    fn step_data(n: usize) -> (Mat, Vec<f32>) {
        let x = Mat::from_fn(n, 3, |i, j| match j {
            0 => i as f32,
            1 => ((i * 7) % 5) as f32,
            _ => ((i * 3) % 4) as f32,
        });
        let y: Vec<f32> = (0..n).map(|i| if i < n / 2 { -1.0 } else { 1.0 }).collect();
        (x, y)
    }

    #[test]
    fn informative_predictor_ranks_first() {
        let (x, y) = step_data(40);
        let forest = RegressionForest {
            trees: 20,
            min_leaf: 2,
            mtry: Some(3),
        };
        let imp = forest.fit_importance(&x, &y, 42).unwrap();
        assert_eq!(imp.len(), 3);
        assert!(imp.iter().all(|&v| v >= 0.0));
        assert!(imp[0] > imp[1] && imp[0] > imp[2]);
    }

    #[test]
    fn same_seed_same_importance() {
        let (x, y) = step_data(30);
        let forest = RegressionForest::new(8, 3);
        let a = forest.fit_importance(&x, &y, 1).unwrap();
        let b = forest.fit_importance(&x, &y, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn thread_count_does_not_matter() {
        let (x, y) = step_data(30);
        let forest = RegressionForest::new(12, 2);
        let fit = |nthreads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(nthreads)
                .build()
                .unwrap()
                .install(|| forest.fit_importance(&x, &y, 9).unwrap())
        };
        assert_eq!(fit(1), fit(4));
    }

    #[test]
    fn constant_response_has_no_importance() {
        let (x, _) = step_data(20);
        let y = vec![3.0_f32; 20];
        let imp = RegressionForest::new(5, 2).fit_importance(&x, &y, 0).unwrap();
        assert!(imp.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn length_mismatch() {
        let (x, _) = step_data(10);
        let err = RegressionForest::default()
            .fit_importance(&x, &[1.0; 9], 0)
            .unwrap_err();
        assert!(matches!(err, ActivityError::DimensionMismatch { .. }));
    }
}
