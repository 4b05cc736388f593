use std::path::Path;

use bitbench_core::costs::CostTable;

use super::super::args::{CostsArgs, CostsSub};
use super::context::Context;
use crate::exit_codes;

pub async fn run(args: CostsArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let ctx = Context::load(config, args.output.output.as_deref())?;
    let path = ctx.config.cost_file();

    match args.cmd {
        CostsSub::Update => {
            let (table, updated) = CostTable::update_from_cache(&ctx.cache, &path).await?;
            println!(
                "Updated {} models ({} total) in {}",
                updated,
                table.costs.len(),
                path.display()
            );
            print_top(&table, 5);
        }
        CostsSub::Show { top } => {
            let table = ctx.cost_table()?;
            if table.costs.is_empty() {
                println!("No cost data in {}; run `bitbench costs update`", path.display());
            } else {
                if !table.meta.last_updated.is_empty() {
                    println!("Last updated {}", table.meta.last_updated);
                }
                print_top(&table, top);
            }
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn print_top(table: &CostTable, n: usize) {
    for (model, cost) in table.most_expensive(n) {
        let samples = table.meta.sample_count.get(model).copied().unwrap_or(0);
        println!("  {:<36} ${:.4}  ({} samples)", model, cost, samples);
    }
}
