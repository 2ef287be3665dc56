use crate::common::*;
use crate::network::Network;

use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, StandardNormal};

pub struct SimArgs {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_sources: usize,
    /// targets per source
    pub n_targets: usize,
    /// standard deviation of the measurement noise
    pub noise: f32,
    pub rseed: u64,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            n_samples: 20,
            n_features: 200,
            n_sources: 10,
            n_targets: 15,
            noise: 0.5,
            rseed: DEFAULT_SEED,
        }
    }
}

pub struct SimOut {
    /// samples x features
    pub data: Named<f32>,
    pub network: Network,
    /// true activities, samples x sources
    pub activity: Named<f32>,
}

/// Simulate measurements driven by known regulator activities
///
/// ```text
/// W(g,k)  = ±1 for the targets g of source k, 0 otherwise
/// A(i,k)  ~ N(0, 1)
/// Y(i,g)  = sum_k A(i,k) W(g,k) + noise * N(0, 1)
/// ```
///
pub fn generate_toy_data(args: &SimArgs) -> anyhow::Result<SimOut> {
    let nn = args.n_samples;
    let dd = args.n_features;
    let kk = args.n_sources;

    anyhow::ensure!(nn > 0 && dd > 0 && kk > 0, "empty simulation");
    anyhow::ensure!(
        args.n_targets > 0 && args.n_targets <= dd,
        "need 1 to {} targets per source",
        dd
    );
    anyhow::ensure!(args.noise >= 0.0, "negative noise");

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.rseed);

    let features: Vec<Box<str>> = (0..dd).map(|g| format!("g{}", g).into()).collect();
    let sources: Vec<Box<str>> = (0..kk).map(|k| format!("r{}", k).into()).collect();
    let samples: Vec<Box<str>> = (0..nn).map(|i| format!("s{}", i).into()).collect();

    // 1. network
    let mut w_dk = DMatrix::<f32>::zeros(dd, kk);
    let mut edges = Vec::with_capacity(kk * args.n_targets);
    for k in 0..kk {
        for g in rand::seq::index::sample(&mut rng, dd, args.n_targets).iter() {
            let w = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            w_dk[(g, k)] = w;
            edges.push((sources[k].clone(), features[g].clone(), w as f64));
        }
    }
    let network = Network::from_edges(edges)?;

    // 2. activities
    let a_nk = DMatrix::<f32>::from_fn(nn, kk, |_, _| StandardNormal.sample(&mut rng));

    // 3. measurements
    let mut y_nd = &a_nk * w_dk.transpose();
    if args.noise > 0.0 {
        let rnorm = Normal::new(0.0_f32, args.noise)?;
        y_nd.iter_mut().for_each(|y| *y += rnorm.sample(&mut rng));
    }

    info!(
        "simulated {} samples x {} features, {} sources with {} targets each",
        nn, dd, kk, args.n_targets
    );

    Ok(SimOut {
        data: MatWithNames {
            rows: samples.clone(),
            cols: features,
            mat: y_nd,
        },
        network,
        activity: MatWithNames {
            rows: samples,
            cols: sources,
            mat: a_nk,
        },
    })
}
