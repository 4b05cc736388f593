use std::path::Path;

use bitbench_core::report::breakdown::question_breakdown;

use super::super::args::BreakdownArgs;
use super::context::Context;
use crate::exit_codes;

const PROMPT_PREVIEW: usize = 72;

pub async fn run(args: BreakdownArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let ctx = Context::load(config, args.output.output.as_deref())?;
    let Some(bd) = question_breakdown(&ctx.cache, &args.suite_id, args.version.as_deref()).await
    else {
        anyhow::bail!(
            "no cached results for suite '{}'{}",
            args.suite_id,
            args.version
                .as_deref()
                .map(|v| format!(" version {}", v))
                .unwrap_or_default()
        );
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bd)?);
        return Ok(exit_codes::SUCCESS);
    }

    println!(
        "{} v{}: {} questions, {} models",
        bd.suite_id, bd.version, bd.total_questions, bd.total_models
    );
    for q in &bd.questions {
        println!(
            "#{:<4} {:>5.1}%  {}/{}  {}",
            q.test_index,
            q.success_rate,
            q.correct_count,
            q.total_models,
            preview(&q.prompt)
        );
        let missed: Vec<&str> = q
            .model_results
            .iter()
            .filter(|m| !m.correct)
            .map(|m| m.model.as_str())
            .collect();
        if !missed.is_empty() {
            println!("       missed by: {}", missed.join(", "));
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn preview(prompt: &str) -> String {
    let line = prompt.lines().next().unwrap_or_default();
    if line.chars().count() > PROMPT_PREVIEW {
        let cut: String = line.chars().take(PROMPT_PREVIEW).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
