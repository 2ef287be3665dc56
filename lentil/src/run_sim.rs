use lentil::common::*;
use lentil::simulate::{generate_toy_data, SimArgs as SimParams};

use clap::Parser;
use matrix_util::common_io::mkdir;
use matrix_util::traits::NamedIoOps;

#[derive(Parser, Debug, Clone)]
pub struct SimArgs {
    /// number of samples
    #[arg(short = 'r', long, default_value_t = 20)]
    n_samples: usize,

    /// number of features
    #[arg(short = 'c', long, default_value_t = 200)]
    n_features: usize,

    /// number of regulators
    #[arg(short = 'k', long, default_value_t = 10)]
    n_sources: usize,

    /// number of targets per regulator
    #[arg(long, default_value_t = 15)]
    n_targets: usize,

    /// measurement noise (standard deviation)
    #[arg(long, default_value_t = 0.5)]
    noise: f32,

    /// random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    rseed: u64,

    /// Output header
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

/// Write `{out}.data.tsv.gz`, `{out}.network.tsv.gz` and
/// `{out}.activity.tsv.gz`
pub fn run_sim_data(args: SimArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    mkdir(&args.out)?;

    let sim = generate_toy_data(&SimParams {
        n_samples: args.n_samples,
        n_features: args.n_features,
        n_sources: args.n_sources,
        n_targets: args.n_targets,
        noise: args.noise,
        rseed: args.rseed,
    })?;

    let data_file = format!("{}.data.tsv.gz", args.out);
    let net_file = format!("{}.network.tsv.gz", args.out);
    let activity_file = format!("{}.activity.tsv.gz", args.out);

    sim.data
        .mat
        .to_named_tsv(&sim.data.rows, &sim.data.cols, &data_file)?;
    sim.network.to_file(&net_file)?;
    sim.activity
        .mat
        .to_named_tsv(&sim.activity.rows, &sim.activity.cols, &activity_file)?;

    info!(
        "wrote simulated files:\n{:?},\n{:?},\n{:?}",
        data_file, net_file, activity_file
    );
    Ok(())
}
