use std::path::Path;

use bitbench_core::cache::cache_status;
use bitbench_core::suite::{default_version, discover_suites};

use super::super::args::SuitesArgs;
use super::context::Context;
use crate::exit_codes;

pub async fn run(args: SuitesArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let ctx = Context::load(config, args.output.output.as_deref())?;
    let version = args.version.clone().unwrap_or_else(default_version);
    let models = ctx.models(&args.models)?;
    let runs = ctx.config.runs_per_model;

    let entries = discover_suites(&args.dir)?;
    if entries.is_empty() {
        println!("No suites found in {}", args.dir.display());
        return Ok(exit_codes::SUCCESS);
    }

    println!("Version {} ({} models, {} runs)", version, models.len(), runs);
    for entry in &entries {
        let status = cache_status(&ctx.cache, &entry.suite, &version, &models, runs).await;
        println!(
            "  {:<28} {:<8} {:>4} tests  {:>6}/{:<6} cached ({:.0}%)  {}",
            entry.id,
            entry.suite.chain,
            entry.suite.tests.len(),
            status.cached_results,
            status.total_expected,
            status.progress,
            entry.suite.name
        );
    }
    Ok(exit_codes::SUCCESS)
}
