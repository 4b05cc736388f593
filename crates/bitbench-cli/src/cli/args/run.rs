use clap::{Parser, ValueEnum};

use super::common::{OutputArgs, SelectionArgs};

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Version label (default: today's date)
    #[arg(long)]
    pub version: Option<String>,

    /// Max in-flight model calls (overrides config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-call timeout, e.g. 400s or 5m
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Delay between successive models' first calls, e.g. 150ms
    #[arg(long)]
    pub stagger: Option<humantime::Duration>,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, value_enum, default_value_t = Provider::Openrouter)]
    pub provider: Provider,

    /// Reply returned by every call when --provider fake
    #[arg(long, default_value = "")]
    pub fake_response: String,

    /// Skip writing latest-report.json
    #[arg(long)]
    pub no_publish: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Openrouter,
    /// Offline scripted client, no network or API key
    Fake,
}
