use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod common;
pub mod run;
pub use common::*;
pub use run::*;

#[derive(Parser)]
#[command(
    name = "bitbench",
    version,
    about = "Benchmark hosted language models against blockchain Q&A suites"
)]
pub struct Cli {
    /// YAML config file (default: ./bitbench.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a suite against the selected models, reusing cached results
    Run(RunArgs),
    /// Show how much of a run is already cached and what the rest would cost
    Status(StatusArgs),
    /// Estimate the full cost of a run
    Estimate(EstimateArgs),
    /// List suites in a directory with their cache progress
    Suites(SuitesArgs),
    /// Inspect or rebuild the per-model cost table
    Costs(CostsArgs),
    /// Per-question results for a cached suite version
    Breakdown(BreakdownArgs),
    /// Print the built-in model catalog
    Models(ModelsArgs),
}

#[cfg(test)]
mod tests;
