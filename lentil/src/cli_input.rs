use lentil::common::*;
use lentil::input::{read_measurement_file, MatrixInput};
use lentil::network::{Network, NetworkColumns};
use lentil::pipeline::PrepareArgs;

use clap::Args;

/// Inputs shared by the estimators
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// samples x features matrix (`.tsv`, `.csv`, optionally `.gz`);
    /// the first line holds feature names, each line starts with a
    /// sample name
    #[arg(required = true)]
    pub data_file: Box<str>,

    /// network table with a header line (`.tsv`, `.csv`, optionally `.gz`)
    #[arg(long, short = 'n', required = true)]
    pub net_file: Box<str>,

    /// column of the network holding regulators
    #[arg(long, default_value = "source")]
    pub source: Box<str>,

    /// column of the network holding target features
    #[arg(long, default_value = "target")]
    pub target: Box<str>,

    /// column of the network holding weights
    #[arg(long, default_value = "weight")]
    pub weight: Box<str>,

    /// ignore weights; every edge counts as 1
    #[arg(long, default_value_t = false)]
    pub unweighted: bool,

    /// the data file is features x samples
    #[arg(long, default_value_t = false)]
    pub transpose: bool,

    /// minimum number of measured targets per regulator
    #[arg(long, default_value_t = DEFAULT_MIN_N)]
    pub min_n: usize,

    /// output header; results go to `{out}.{method}_{kind}.tsv.gz`
    #[arg(long, short, required = true)]
    pub out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    pub verbose: bool,
}

impl InputArgs {
    pub fn init_logger(&self) {
        if self.verbose {
            std::env::set_var("RUST_LOG", "info");
        }
        env_logger::init();
    }

    pub fn read_network(&self) -> anyhow::Result<Network> {
        let columns = NetworkColumns {
            source: self.source.clone(),
            target: self.target.clone(),
            weight: (!self.unweighted).then(|| self.weight.clone()),
        };
        Network::from_file(&self.net_file, &columns)
    }

    pub fn read_data<T>(&self) -> anyhow::Result<MatrixInput<T>>
    where
        T: ActScalar + std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Debug,
    {
        read_measurement_file(&self.data_file, self.transpose)
    }

    pub fn prepare_args(&self) -> PrepareArgs {
        PrepareArgs {
            min_n: self.min_n,
            ..Default::default()
        }
    }
}
