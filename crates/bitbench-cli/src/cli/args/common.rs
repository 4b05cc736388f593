use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Which suite and models a command operates on.
#[derive(Args, Clone, Debug)]
pub struct SelectionArgs {
    /// Suite definition file (JSON)
    #[arg(long)]
    pub suite: PathBuf,

    /// Comma-separated model names; all catalog models when omitted
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Runs per model (overrides config)
    #[arg(long)]
    pub runs: Option<u32>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct OutputArgs {
    /// Results directory holding the cache, reports and cost table
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Version label (default: today's date)
    #[arg(long)]
    pub version: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Clone, Debug)]
pub struct SuitesArgs {
    /// Directory containing suite files
    #[arg(long, default_value = "tests")]
    pub dir: PathBuf,

    /// Version label used for cache progress (default: today's date)
    #[arg(long)]
    pub version: Option<String>,

    /// Comma-separated model names; all catalog models when omitted
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Clone, Debug)]
pub struct CostsArgs {
    #[command(subcommand)]
    pub cmd: CostsSub,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Clone, Debug)]
pub enum CostsSub {
    /// Rebuild average costs from every cached result
    Update,
    /// Print the current table, most expensive first
    Show {
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

#[derive(Parser, Clone, Debug)]
pub struct BreakdownArgs {
    #[arg(long)]
    pub suite_id: String,

    /// Version label (default: latest cached version)
    #[arg(long)]
    pub version: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct ModelsArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}
