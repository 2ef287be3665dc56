use crate::common::*;
use crate::error::{ActResult, ActivityError};
use crate::input::Measurement;

use indicatif::ParallelProgressIterator;
use nalgebra::DMatrix;
use ndarray::{Array2, Array3, Axis};
use num_traits::Float;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

/// Permutation test settings
#[derive(Debug, Clone, Copy)]
pub struct WsumArgs {
    /// number of random permutations (`<= 1` skips the test)
    pub times: usize,
    /// random seed
    pub seed: u64,
}

impl Default for WsumArgs {
    fn default() -> Self {
        Self {
            times: DEFAULT_TIMES,
            seed: DEFAULT_SEED,
        }
    }
}

/// Weighted sum estimates, samples x sources
#[derive(Debug, Clone, PartialEq)]
pub struct WsumOut<T: ActScalar> {
    pub estimate: DMatrix<T>,
    /// z-score against the permutation null
    pub norm: Option<DMatrix<T>>,
    /// `estimate * -log10(pvals)`
    pub corr: Option<DMatrix<T>>,
    /// empirical p-values
    pub pvals: Option<DMatrix<T>>,
}

/// Weighted sum `mat * coef`
///
/// * `mat` - sample x feature measurements
/// * `coef` - feature x source weights
///
pub fn estimate<T: ActScalar>(mat: &Measurement<T>, coef: &DMatrix<T>) -> ActResult<DMatrix<T>> {
    if mat.ncols() != coef.nrows() {
        return Err(ActivityError::DimensionMismatch {
            what: "measured features and coefficient rows",
            left: mat.ncols(),
            right: coef.nrows(),
        });
    }
    Ok(mat.dot(coef))
}

/// Weighted sum with a permutation test.
///
/// Each permutation shuffles the feature (row) axis of `coef`, the
/// same shuffle for every source, and recomputes the weighted sum.
/// With `times <= 1` only the estimate is returned.
///
/// * `pvals = (1 + #{|null| > |estimate|}) / times`, at most 1
/// * `norm = (estimate - mean(null)) / sd(null)`, `NaN` where `sd = 0`
/// * `corr = estimate * -log10(pvals)`
///
pub fn run<T: ActScalar>(
    mat: &Measurement<T>,
    coef: &DMatrix<T>,
    times: usize,
    seed: u64,
) -> ActResult<WsumOut<T>> {
    let est = estimate(mat, coef)?;

    if times <= 1 {
        return Ok(WsumOut {
            estimate: est,
            norm: None,
            corr: None,
            pvals: None,
        });
    }

    let perms = draw_permutations(coef.nrows(), times, seed);

    // each permutation fills its own slice of the null distribution
    let null_slices: Vec<DMatrix<T>> = perms
        .par_iter()
        .progress_with(new_progress_bar(times))
        .map(|perm| mat.dot(&coef.select_rows(perm.iter())))
        .collect();

    let (nsample, nsource) = est.shape();
    let null = Array3::<T>::from_shape_fn((nsample, nsource, times), |(i, j, p)| {
        null_slices[p][(i, j)]
    });
    drop(null_slices);

    let pvals = empirical_pvalues(&est, &null);
    let norm = z_scores(&est, &null);
    let corr = est.zip_map(&pvals, |x, p| x * -Float::log10(p));

    Ok(WsumOut {
        estimate: est,
        norm: Some(norm),
        corr: Some(corr),
        pvals: Some(pvals),
    })
}

/// `times` permutations of `0..n` from a single seeded generator,
/// drawn one after another
fn draw_permutations(n: usize, times: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..times)
        .map(|_| {
            let mut idx: Vec<usize> = (0..n).collect();
            idx.shuffle(&mut rng);
            idx
        })
        .collect()
}

fn empirical_pvalues<T: ActScalar>(est: &DMatrix<T>, null: &Array3<T>) -> DMatrix<T> {
    let times = null.len_of(Axis(2));
    let denom = T::from_usize(times).unwrap_or_else(T::one);

    DMatrix::<T>::from_fn(est.nrows(), est.ncols(), |i, j| {
        let obs = Float::abs(est[(i, j)]);
        let nexceed = null
            .slice(ndarray::s![i, j, ..])
            .iter()
            .filter(|&&x| Float::abs(x) > obs)
            .count();
        let k = T::from_usize(nexceed + 1).unwrap_or_else(T::one);
        Float::min(k / denom, T::one())
    })
}

fn z_scores<T: ActScalar>(est: &DMatrix<T>, null: &Array3<T>) -> DMatrix<T> {
    let zero = T::zero();
    let mu: Array2<T> = null
        .mean_axis(Axis(2))
        .unwrap_or_else(|| Array2::from_elem((est.nrows(), est.ncols()), <T as Float>::nan()));
    let sd: Array2<T> = null.std_axis(Axis(2), zero);

    let mut ndegenerate = 0_usize;
    let norm = DMatrix::<T>::from_fn(est.nrows(), est.ncols(), |i, j| {
        let s = sd[[i, j]];
        if s > zero {
            (est[(i, j)] - mu[[i, j]]) / s
        } else {
            ndegenerate += 1;
            <T as Float>::nan()
        }
    });

    if ndegenerate > 0 {
        warn!(
            "{} (sample, source) pairs have a constant permutation null; their z-scores are NaN",
            ndegenerate
        );
    }
    norm
}
