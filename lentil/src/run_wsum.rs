use crate::cli_input::InputArgs;

use lentil::common::*;
use lentil::pipeline::run_wsum;
use lentil::sink::FileSink;
use lentil::wsum::WsumArgs as WsumParams;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct WsumArgs {
    #[command(flatten)]
    input: InputArgs,

    /// number of permutations; 0 or 1 to skip the permutation test
    #[arg(long, short = 't', default_value_t = DEFAULT_TIMES)]
    times: usize,

    /// random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// number of threads
    #[arg(long, short = 'j', default_value_t = num_cpus::get())]
    n_jobs: usize,
}

/// Weighted sum of target readings with a permutation test
pub fn run_wsum_cli(args: WsumArgs) -> anyhow::Result<()> {
    args.input.init_logger();

    let data = args.input.read_data::<f32>()?;
    let net = args.input.read_network()?;

    let params = WsumParams {
        times: args.times,
        seed: args.seed,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.n_jobs.max(1))
        .build()?;

    let result = pool.install(|| run_wsum(&data, &net, &args.input.prepare_args(), &params))?;

    let mut sink = FileSink::new(&args.input.out)?;
    result.store_into(&mut sink)?;

    info!("done");
    Ok(())
}
