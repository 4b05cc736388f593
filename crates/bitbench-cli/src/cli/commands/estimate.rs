use std::path::Path;

use bitbench_core::costs::estimate_cost;
use bitbench_core::suite::load_suite;

use super::super::args::EstimateArgs;
use super::context::Context;
use crate::exit_codes;

pub fn run(args: EstimateArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let ctx = Context::load(config, args.output.output.as_deref())?;
    let suite = load_suite(&args.selection.suite)?;
    let models = ctx.models(&args.selection.models)?;
    let runs = ctx.runs(args.selection.runs);
    let tests = suite.tests.len();

    let width = models.iter().map(|m| m.name.len()).max().unwrap_or(5).max(5);
    println!("{:<width$}  {:>10}  {:>10}", "Model", "Per test", "Total");
    for m in &models {
        println!(
            "{:<width$}  {:>10}  {:>10}",
            m.name,
            format!("${:.4}", m.avg_cost_per_test),
            format!("${:.4}", estimate_cost(std::slice::from_ref(m), tests, runs)),
        );
    }
    println!();
    println!(
        "{} models x {} tests x {} runs = {} units, estimated ${:.4}",
        models.len(),
        tests,
        runs,
        models.len() * tests * runs as usize,
        estimate_cost(&models, tests, runs)
    );
    Ok(exit_codes::SUCCESS)
}
