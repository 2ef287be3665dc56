use lentil::input::{MatrixInput, Measurement};
use lentil::network::Network;
use lentil::pipeline::{prepare, run_wsum, PrepareArgs};
use lentil::simulate::{generate_toy_data, SimArgs};
use lentil::wsum::{self, WsumArgs};

use nalgebra::DMatrix;

fn names(xs: &[&str]) -> Vec<Box<str>> {
    xs.iter().map(|&x| Box::from(x)).collect()
}

fn three_by_four() -> MatrixInput<f64> {
    MatrixInput::Triple {
        mat: Measurement::Dense(DMatrix::from_row_slice(
            3,
            4,
            &[
                1.0, 2.0, 3.0, 4.0, //
                -1.0, 0.5, 2.5, 0.0, //
                3.0, -2.0, 1.0, 5.0,
            ],
        )),
        rows: names(&["s1", "s2", "s3"]),
        cols: names(&["G1", "G2", "G3", "G4"]),
    }
}

fn two_regulators() -> Network {
    Network::from_edges(vec![
        ("T1", "G1", 1.0),
        ("T1", "G3", -1.0),
        ("T2", "G2", 2.0),
        ("T2", "G4", 1.0),
    ])
    .unwrap()
}

fn min_n(n: usize) -> PrepareArgs {
    PrepareArgs {
        min_n: n,
        ..Default::default()
    }
}

#[test]
fn end_to_end_three_samples_two_regulators() -> anyhow::Result<()> {
    let args = WsumArgs { times: 50, seed: 0 };
    let res = run_wsum(&three_by_four(), &two_regulators(), &min_n(2), &args)?;

    assert_eq!(res.estimate.cols, names(&["T1", "T2"]));
    assert_eq!(res.estimate.rows, names(&["s1", "s2", "s3"]));
    assert_eq!(res.estimate.mat.shape(), (3, 2));
    approx::assert_abs_diff_eq!(res.estimate.mat[(0, 0)], 1.0 - 3.0);
    approx::assert_abs_diff_eq!(res.estimate.mat[(2, 1)], -4.0 + 5.0);

    let pvals = res.pvals.expect("pvals");
    assert_eq!(pvals.mat.shape(), (3, 2));
    assert!(pvals.mat.iter().all(|&p| p > 0.0 && p <= 1.0));

    let norm = res.norm.expect("norm");
    assert_eq!(norm.mat.shape(), (3, 2));
    assert!(norm.mat.iter().all(|x| x.is_finite() || x.is_nan()));

    assert_eq!(res.corr.expect("corr").mat.shape(), (3, 2));
    Ok(())
}

#[test]
fn unmeasured_targets_do_not_contribute() -> anyhow::Result<()> {
    let with_extra = Network::from_edges(vec![
        ("T1", "G1", 1.0),
        ("T1", "G3", -1.0),
        ("T1", "G99", 100.0),
        ("T2", "G2", 2.0),
        ("T2", "G4", 1.0),
    ])?;

    let args = WsumArgs { times: 0, seed: 0 };
    let a = run_wsum(&three_by_four(), &two_regulators(), &min_n(2), &args)?;
    let b = run_wsum(&three_by_four(), &with_extra, &min_n(2), &args)?;
    assert_eq!(a.estimate, b.estimate);
    Ok(())
}

#[test]
fn coefficients_follow_measured_features() -> anyhow::Result<()> {
    let prepared = prepare(&three_by_four(), &two_regulators(), &min_n(2))?;
    assert_eq!(prepared.coef.nrows(), 4);
    assert_eq!(
        prepared.coef.column(0).iter().copied().collect::<Vec<_>>(),
        vec![1.0, 0.0, -1.0, 0.0]
    );
    assert_eq!(
        prepared.coef.column(1).iter().copied().collect::<Vec<_>>(),
        vec![0.0, 2.0, 0.0, 1.0]
    );
    Ok(())
}

#[test]
fn estimate_is_pure() -> anyhow::Result<()> {
    let prepared = prepare(&three_by_four(), &two_regulators(), &min_n(2))?;
    let a = wsum::estimate(&prepared.mat, &prepared.coef)?;
    let b = wsum::estimate(&prepared.mat, &prepared.coef)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn seeded_permutations() -> anyhow::Result<()> {
    let prepared = prepare(&three_by_four(), &two_regulators(), &min_n(2))?;
    let (mat, coef) = (&prepared.mat, &prepared.coef);

    let a = wsum::run(mat, coef, 50, 7)?;
    let b = wsum::run(mat, coef, 50, 7)?;
    assert_eq!(a, b);

    let c = wsum::run(mat, coef, 50, 8)?;
    assert_eq!(a.estimate, c.estimate);
    assert_ne!(a.norm, c.norm);

    let one = wsum::run(mat, coef, 1, 7)?;
    assert!(one.norm.is_none() && one.corr.is_none() && one.pvals.is_none());
    Ok(())
}

#[test]
fn too_strict_min_n() {
    let err = run_wsum(
        &three_by_four(),
        &two_regulators(),
        &min_n(3),
        &WsumArgs::default(),
    );
    assert!(matches!(err, Err(lentil::error::ActivityError::EmptyNetwork(_))));
}

#[test]
fn recovers_simulated_activities() -> anyhow::Result<()> {
    let sim = generate_toy_data(&SimArgs {
        n_samples: 30,
        n_features: 100,
        n_sources: 5,
        n_targets: 15,
        noise: 0.1,
        rseed: 3,
    })?;

    let input = MatrixInput::Table(sim.data);
    let args = WsumArgs { times: 0, seed: 0 };
    let res = run_wsum(&input, &sim.network, &min_n(5), &args)?;
    assert_eq!(res.estimate.cols, sim.activity.cols);

    for k in 0..5 {
        let x = res.estimate.mat.column(k);
        let y = sim.activity.mat.column(k);
        let (mx, my) = (x.mean(), y.mean());
        let sxy: f32 = x.iter().zip(y.iter()).map(|(a, b)| (a - mx) * (b - my)).sum();
        let sxx: f32 = x.iter().map(|a| (a - mx) * (a - mx)).sum();
        let syy: f32 = y.iter().map(|b| (b - my) * (b - my)).sum();
        assert!(sxy / (sxx * syy).sqrt() > 0.8);
    }
    Ok(())
}
