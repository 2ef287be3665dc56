use crate::common::*;
use crate::error::{ActResult, ActivityError};
use crate::forest::{ImportanceFit, RegressionForest};

use indicatif::ParallelProgressIterator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Forest settings per sample
#[derive(Debug, Clone, Copy)]
pub struct MdtArgs {
    /// number of trees per sample
    pub trees: usize,
    /// minimum number of features on each side of a split
    pub min_leaf: usize,
    /// random seed
    pub seed: u64,
    /// number of threads
    pub n_jobs: usize,
}

impl Default for MdtArgs {
    fn default() -> Self {
        Self {
            trees: DEFAULT_TREES,
            min_leaf: DEFAULT_MIN_LEAF,
            seed: DEFAULT_SEED,
            n_jobs: num_cpus::get(),
        }
    }
}

/// Regulator activities as forest importances, one forest per sample.
///
/// For sample `i`, the forest regresses the readings `mat[i, ..]` of
/// all features on the feature x regulator coefficients; the impurity
/// importance of regulator `j` becomes activity `(i, j)`.
///
/// * `mat` - samples x features
/// * `coef` - features x regulators
/// * `args` - forest size, seed, threads
///
pub fn run(mat: &Mat, coef: &Mat, args: &MdtArgs) -> ActResult<Mat> {
    let forest = RegressionForest::new(args.trees, args.min_leaf);
    run_with(&forest, mat, coef, args.seed, args.n_jobs)
}

/// Same as [`run`] with any importance model
///
/// Sample seeds are drawn from one generator in sample order. All the
/// work, including the model's own parallel loops, runs in a pool of
/// `n_jobs` threads.
pub fn run_with<F: ImportanceFit>(
    model: &F,
    mat: &Mat,
    coef: &Mat,
    seed: u64,
    n_jobs: usize,
) -> ActResult<Mat> {
    if mat.ncols() != coef.nrows() {
        return Err(ActivityError::DimensionMismatch {
            what: "measured features and coefficient rows",
            left: mat.ncols(),
            right: coef.nrows(),
        });
    }

    let nsample = mat.nrows();
    let nsource = coef.ncols();

    let mut rng = StdRng::seed_from_u64(seed);
    let sample_seeds: Vec<u64> = (0..nsample).map(|_| rng.random()).collect();

    let fit_sample = |i: usize| -> ActResult<DVec> {
        let y: Vec<f32> = mat.row(i).iter().copied().collect();
        let imp = model.fit_importance(coef, &y, sample_seeds[i])?;
        if imp.len() != nsource {
            return Err(ActivityError::DimensionMismatch {
                what: "importances and regulators",
                left: imp.len(),
                right: nsource,
            });
        }
        Ok(imp)
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_jobs.max(1))
        .build()?;

    let per_sample: Vec<DVec> = pool.install(|| {
        (0..nsample)
            .into_par_iter()
            .progress_with(new_progress_bar(nsample))
            .map(fit_sample)
            .collect::<ActResult<Vec<_>>>()
    })?;

    let mut ret = Mat::zeros(nsample, nsource);
    for (i, imp) in per_sample.iter().enumerate() {
        ret.row_mut(i).copy_from(&imp.transpose());
    }
    Ok(ret)
}
