use crate::common::*;
use crate::error::ActResult;
use crate::input::{extract, Extracted, MatrixInput, Measurement, UseRaw};
use crate::mdt::{self, MdtArgs};
use crate::net_matrix::build_net_matrix;
use crate::network::Network;
use crate::sink::ActivitySink;
use crate::wsum::{self, WsumArgs};

use nalgebra::DMatrix;

/// Shared preprocessing settings
#[derive(Debug, Clone, Copy)]
pub struct PrepareArgs {
    /// minimum number of measured targets per source
    pub min_n: usize,
    pub use_raw: UseRaw,
}

impl Default for PrepareArgs {
    fn default() -> Self {
        Self {
            min_n: DEFAULT_MIN_N,
            use_raw: UseRaw::IfPresent,
        }
    }
}

/// Measurements with the aligned feature x source coefficients
pub struct Prepared<T: ActScalar> {
    pub mat: Measurement<T>,
    /// sample names
    pub rows: Vec<Box<str>>,
    /// source names, the columns of `coef`
    pub sources: Vec<Box<str>>,
    /// features x sources
    pub coef: DMatrix<T>,
}

/// Extract the measurement matrix, filter the network by `min_n`,
/// pivot it and align its rows to the measured features
pub fn prepare<T: ActScalar>(
    input: &MatrixInput<T>,
    net: &Network,
    args: &PrepareArgs,
) -> ActResult<Prepared<T>> {
    let Extracted { mat, rows, cols } = extract(input, args.use_raw)?;
    let nm = build_net_matrix::<T>(&cols, net, args.min_n)?;
    let coef = nm.align_to(&cols)?;
    Ok(Prepared {
        mat,
        rows,
        sources: nm.sources,
        coef,
    })
}

fn labeled<T: ActScalar>(rows: &[Box<str>], cols: &[Box<str>], mat: DMatrix<T>) -> Named<T> {
    MatWithNames {
        rows: rows.to_vec(),
        cols: cols.to_vec(),
        mat,
    }
}

/// Labeled weighted-sum results (samples x sources)
#[derive(Debug, Clone)]
pub struct WsumResult<T: ActScalar> {
    pub estimate: Named<T>,
    pub norm: Option<Named<T>>,
    pub corr: Option<Named<T>>,
    pub pvals: Option<Named<T>>,
}

impl<T: ActScalar> WsumResult<T> {
    /// Store under `wsum_estimate`, `wsum_norm`, `wsum_corr` and
    /// `wsum_pvals`; missing permutation outputs are skipped
    pub fn store_into(&self, sink: &mut dyn ActivitySink<T>) -> anyhow::Result<()> {
        sink.store("wsum_estimate", &self.estimate)?;
        let extra = [
            ("wsum_norm", &self.norm),
            ("wsum_corr", &self.corr),
            ("wsum_pvals", &self.pvals),
        ];
        for (key, mat) in extra {
            if let Some(mat) = mat {
                sink.store(key, mat)?;
            }
        }
        Ok(())
    }
}

/// Weighted-sum activities from any supported input
///
/// * `input` - measurements (samples x features)
/// * `net` - regulatory network
/// * `prep` - `min_n` and raw layer preference
/// * `args` - permutations and seed
///
pub fn run_wsum<T: ActScalar>(
    input: &MatrixInput<T>,
    net: &Network,
    prep: &PrepareArgs,
    args: &WsumArgs,
) -> ActResult<WsumResult<T>> {
    let Prepared {
        mat,
        rows,
        sources,
        coef,
    } = prepare(input, net, prep)?;

    info!(
        "Running wsum on {} samples and {} sources",
        mat.nrows(),
        sources.len()
    );

    let out = wsum::run(&mat, &coef, args.times, args.seed)?;

    let label = |x: DMatrix<T>| labeled(&rows, &sources, x);

    Ok(WsumResult {
        estimate: label(out.estimate),
        norm: out.norm.map(label),
        corr: out.corr.map(label),
        pvals: out.pvals.map(label),
    })
}

/// Labeled forest-importance activities (samples x sources)
#[derive(Debug, Clone)]
pub struct MdtResult {
    pub estimate: Named<f32>,
}

impl MdtResult {
    /// Store under `mdt_estimate`
    pub fn store_into(&self, sink: &mut dyn ActivitySink<f32>) -> anyhow::Result<()> {
        sink.store("mdt_estimate", &self.estimate)
    }
}

/// Forest-importance activities from any supported input
///
/// The forest needs every reading, so sparse measurements are
/// densified first.
pub fn run_mdt(
    input: &MatrixInput<f32>,
    net: &Network,
    prep: &PrepareArgs,
    args: &MdtArgs,
) -> ActResult<MdtResult> {
    let Prepared {
        mat,
        rows,
        sources,
        coef,
    } = prepare(input, net, prep)?;

    info!(
        "Running mdt on {} samples and {} sources",
        mat.nrows(),
        sources.len()
    );

    let estimate = mdt::run(&mat.to_dense(), &coef, args)?;

    Ok(MdtResult {
        estimate: labeled(&rows, &sources, estimate),
    })
}
