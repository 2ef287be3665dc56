use crate::cli_input::InputArgs;

use lentil::common::*;
use lentil::mdt::MdtArgs as MdtParams;
use lentil::pipeline::run_mdt;
use lentil::sink::FileSink;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct MdtArgs {
    #[command(flatten)]
    input: InputArgs,

    /// number of trees per sample
    #[arg(long, default_value_t = DEFAULT_TREES)]
    trees: usize,

    /// minimum number of features on each side of a split
    #[arg(long, default_value_t = DEFAULT_MIN_LEAF)]
    min_leaf: usize,

    /// random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// number of threads
    #[arg(long, short = 'j', default_value_t = num_cpus::get())]
    n_jobs: usize,
}

/// Regression forest importances per sample
pub fn run_mdt_cli(args: MdtArgs) -> anyhow::Result<()> {
    args.input.init_logger();

    let data = args.input.read_data::<f32>()?;
    let net = args.input.read_network()?;

    let params = MdtParams {
        trees: args.trees,
        min_leaf: args.min_leaf,
        seed: args.seed,
        n_jobs: args.n_jobs,
    };

    let result = run_mdt(&data, &net, &args.input.prepare_args(), &params)?;

    let mut sink = FileSink::new(&args.input.out)?;
    result.store_into(&mut sink)?;

    info!("done");
    Ok(())
}
