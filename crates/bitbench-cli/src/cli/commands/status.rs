use std::path::Path;

use bitbench_core::cache::{cache_status, CacheStatus};
use bitbench_core::costs::estimate_remaining_cost;
use bitbench_core::engine::plan::build_plan;
use bitbench_core::suite::{default_version, load_suite};
use serde::Serialize;

use super::super::args::StatusArgs;
use super::context::Context;
use crate::exit_codes;

#[derive(Serialize)]
struct StatusOutput {
    suite_id: String,
    version: String,
    models: usize,
    #[serde(flatten)]
    status: CacheStatus,
    remaining_units: usize,
    remaining_cost: f64,
}

pub async fn run(args: StatusArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let ctx = Context::load(config, args.output.output.as_deref())?;
    let suite = load_suite(&args.selection.suite)?;
    let version = args.version.clone().unwrap_or_else(default_version);
    let models = ctx.models(&args.selection.models)?;
    let runs = ctx.runs(args.selection.runs);

    let status = cache_status(&ctx.cache, &suite, &version, &models, runs).await;

    let mut settings = ctx.config.run_settings();
    settings.runs_per_model = runs;
    let plan = build_plan(&ctx.cache, &suite, &version, &models, &settings).await?;

    let out = StatusOutput {
        suite_id: suite.id.clone(),
        version,
        models: models.len(),
        status,
        remaining_units: plan.execute_count(),
        remaining_cost: estimate_remaining_cost(&models, &plan.totals),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(exit_codes::SUCCESS);
    }

    println!("Suite:     {} ({})", suite.name, out.suite_id);
    println!("Version:   {}", out.version);
    println!("Models:    {}", out.models);
    println!(
        "Cached:    {}/{} ({:.0}%)",
        out.status.cached_results, out.status.total_expected, out.status.progress
    );
    println!(
        "Remaining: {} units, est. ${:.4}",
        out.remaining_units, out.remaining_cost
    );
    if out.status.can_resume {
        println!("A rerun resumes from cache.");
    }
    Ok(exit_codes::SUCCESS)
}
