use crate::common::*;
use crate::error::{ActResult, ActivityError};
use crate::network::Network;

use fnv::FnvHashMap as HashMap;
use fnv::FnvHashSet as HashSet;
use nalgebra::DMatrix;

/// A target x source coefficient matrix pivoted from a network
#[derive(Debug, Clone)]
pub struct NetMatrix<T: ActScalar> {
    /// regulators (columns)
    pub sources: Vec<Box<str>>,
    /// features (rows)
    pub targets: Vec<Box<str>>,
    pub coef: DMatrix<T>,
}

/// Drop sources with fewer than `min_n` targets.
///
/// Only the targets measured in `features` count, and only if their
/// weight is non-zero, so every surviving source keeps at least
/// `min_n` usable coefficients after alignment.
///
/// * `features` - feature names of the measurement matrix
/// * `net` - network
/// * `min_n` - minimum number of distinct targets per source
///
pub fn filter_min_n(features: &[Box<str>], net: &Network, min_n: usize) -> ActResult<Network> {
    let features: HashSet<&str> = features.iter().map(|x| x.as_ref()).collect();

    let shared = net.retain(|e| features.contains(e.target.as_ref()));

    // every source with a measured edge starts at zero targets
    let mut targets_per_source: HashMap<&str, HashSet<&str>> = HashMap::default();
    for e in shared.edges() {
        let targets = targets_per_source.entry(e.source.as_ref()).or_default();
        if e.weight != 0.0 {
            targets.insert(e.target.as_ref());
        }
    }

    let kept: HashSet<Box<str>> = targets_per_source
        .into_iter()
        .filter(|(_, targets)| targets.len() >= min_n)
        .map(|(s, _)| Box::from(s))
        .collect();

    let ret = shared.retain(|e| kept.contains(&e.source));

    if ret.is_empty() {
        return Err(ActivityError::EmptyNetwork(format!(
            "no source has at least {} targets among the {} measured features",
            min_n,
            features.len()
        )));
    }

    let ndropped = net.sources().len() - kept.len();
    if ndropped > 0 {
        info!(
            "Dropped {} sources with fewer than {} targets; {} left",
            ndropped,
            min_n,
            kept.len()
        );
    }

    Ok(ret)
}

impl<T: ActScalar> NetMatrix<T> {
    /// Pivot a long-format network into a target x source matrix;
    /// missing pairs are zero.
    pub fn from_network(net: &Network) -> ActResult<Self> {
        let sources = net.sources();
        let targets = net.targets();

        let source_index: HashMap<&str, usize> = sources
            .iter()
            .enumerate()
            .map(|(j, x)| (x.as_ref(), j))
            .collect();

        let target_index: HashMap<&str, usize> = targets
            .iter()
            .enumerate()
            .map(|(i, x)| (x.as_ref(), i))
            .collect();

        let mut coef = DMatrix::<T>::zeros(targets.len(), sources.len());
        let mut filled: HashSet<(usize, usize)> = HashSet::default();

        for e in net.edges() {
            let i = target_index[e.target.as_ref()];
            let j = source_index[e.source.as_ref()];

            if !filled.insert((i, j)) {
                return Err(ActivityError::validation(format!(
                    "duplicate edge {} -> {}",
                    e.source, e.target
                )));
            }

            coef[(i, j)] = T::from_f64(e.weight).ok_or_else(|| {
                ActivityError::validation(format!("weight {} is not representable", e.weight))
            })?;
        }

        Ok(Self {
            sources,
            targets,
            coef,
        })
    }
}

/// Filter the network by `min_n` and pivot it into a coefficient
/// matrix (not yet aligned to `features`).
pub fn build_net_matrix<T: ActScalar>(
    features: &[Box<str>],
    net: &Network,
    min_n: usize,
) -> ActResult<NetMatrix<T>> {
    let net = filter_min_n(features, net, min_n)?;
    NetMatrix::from_network(&net)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<Box<str>> {
        xs.iter().map(|&x| Box::from(x)).collect()
    }

    fn toy_network() -> Network {
        Network::from_edges(vec![
            ("T2", "G1", 1.0),
            ("T2", "G2", -2.0),
            ("T2", "G3", 0.5),
            ("T1", "G1", 1.0),
            ("T1", "G4", 1.0),
            ("T3", "G1", 1.0),
            ("T3", "G9", 1.0),
            ("T3", "G2", 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn pivot_sorted_and_zero_filled() {
        let nm = NetMatrix::<f64>::from_network(&toy_network()).unwrap();
        assert_eq!(nm.sources, names(&["T1", "T2", "T3"]));
        assert_eq!(nm.targets, names(&["G1", "G2", "G3", "G4", "G9"]));
        assert_eq!(nm.coef.shape(), (5, 3));
        assert_eq!(nm.coef[(1, 1)], -2.0);
        assert_eq!(nm.coef[(3, 1)], 0.0);
        assert_eq!(nm.coef[(4, 2)], 1.0);
    }

    #[test]
    fn min_n_counts_measured_non_zero_targets() {
        let features = names(&["G1", "G2", "G3", "G4"]);
        let net = filter_min_n(&features, &toy_network(), 2).unwrap();
        // T3 has G1 and G9 (not measured) and a zero weight on G2
        assert_eq!(net.sources(), names(&["T1", "T2"]));

        let net = filter_min_n(&features, &toy_network(), 3).unwrap();
        assert_eq!(net.sources(), names(&["T2"]));

        let err = filter_min_n(&features, &toy_network(), 4).unwrap_err();
        assert!(matches!(err, ActivityError::EmptyNetwork(_)));
    }

    #[test]
    fn zero_min_n_keeps_zero_weight_sources() {
        let features = names(&["G1", "G2"]);
        let net = Network::from_edges(vec![("T1", "G1", 1.0), ("T2", "G2", 0.0)]).unwrap();

        let kept = filter_min_n(&features, &net, 0).unwrap();
        assert_eq!(kept.sources(), names(&["T1", "T2"]));

        let kept = filter_min_n(&features, &net, 1).unwrap();
        assert_eq!(kept.sources(), names(&["T1"]));
    }

    #[test]
    fn raising_min_n_never_adds_sources() {
        let features = names(&["G1", "G2", "G3", "G4", "G9"]);
        let mut prev = usize::MAX;
        for min_n in 0..6 {
            let n = filter_min_n(&features, &toy_network(), min_n)
                .map(|net| net.sources().len())
                .unwrap_or(0);
            assert!(n <= prev);
            prev = n;
        }
    }
}
