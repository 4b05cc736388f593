use std::path::Path;

use super::super::args::ModelsArgs;
use super::context::Context;
use crate::exit_codes;

pub fn run(args: ModelsArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let ctx = Context::load(config, args.output.output.as_deref())?;
    let models = ctx.models(&[])?;

    for m in &models {
        let effort = m
            .invocation_options
            .pointer("/reasoning/effort")
            .and_then(|v| v.as_str())
            .map(|e| format!(" effort={}", e))
            .unwrap_or_default();
        println!(
            "{:<36} {:<48} {:<9} ${:.4}{}",
            m.name,
            m.provider_model,
            if m.reasoning { "reasoning" } else { "-" },
            m.avg_cost_per_test,
            effort
        );
    }
    println!("{} models", models.len());
    Ok(exit_codes::SUCCESS)
}
