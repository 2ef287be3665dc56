use crate::common::*;
use crate::error::{ActResult, ActivityError};
use crate::net_matrix::NetMatrix;

use fnv::FnvHashMap as HashMap;
use nalgebra::DMatrix;

/// Reorder the rows of a target x source matrix to follow `features`.
///
/// Row `i` of the output is the row of `features[i]` in `coef`, or
/// zeros if that feature is not a target. Targets that are not
/// features are dropped.
///
/// * `features` - feature names of the measurement matrix
/// * `targets` - row names of `coef`
/// * `coef` - target x source coefficients
///
pub fn match_features<T: ActScalar>(
    features: &[Box<str>],
    targets: &[Box<str>],
    coef: &DMatrix<T>,
) -> ActResult<DMatrix<T>> {
    if coef.nrows() != targets.len() {
        return Err(ActivityError::DimensionMismatch {
            what: "coefficient rows and target labels",
            left: coef.nrows(),
            right: targets.len(),
        });
    }

    let target_index: HashMap<&str, usize> = targets
        .iter()
        .enumerate()
        .map(|(i, x)| (x.as_ref(), i))
        .collect();

    let mut ret = DMatrix::<T>::zeros(features.len(), coef.ncols());
    let mut nmatched = 0;

    for (i, f) in features.iter().enumerate() {
        if let Some(&r) = target_index.get(f.as_ref()) {
            ret.row_mut(i).copy_from(&coef.row(r));
            nmatched += 1;
        }
    }

    if nmatched == 0 {
        return Err(ActivityError::EmptyResult(
            "no target of the network is among the measured features".into(),
        ));
    }

    if nmatched < targets.len() {
        info!(
            "{} of {} network targets are not measured",
            targets.len() - nmatched,
            targets.len()
        );
    }

    Ok(ret)
}

impl<T: ActScalar> NetMatrix<T> {
    /// Feature x source coefficients aligned to `features`
    pub fn align_to(&self, features: &[Box<str>]) -> ActResult<DMatrix<T>> {
        match_features(features, &self.targets, &self.coef)
    }
}
