mod cli_input;
mod run_mdt;
mod run_sim;
mod run_wsum;

use crate::run_mdt::*;
use crate::run_sim::*;
use crate::run_wsum::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Weighted sum of target readings with a permutation test
    Wsum(WsumArgs),

    /// Regression forest importances of regulators, one forest per sample
    Mdt(MdtArgs),

    /// Simulate measurements driven by known regulator activities
    Simulate(SimArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Wsum(args) => {
            run_wsum_cli(args.clone())?;
        }
        Commands::Mdt(args) => {
            run_mdt_cli(args.clone())?;
        }
        Commands::Simulate(args) => {
            run_sim_data(args.clone())?;
        }
    }

    Ok(())
}
