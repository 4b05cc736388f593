use std::path::Path;
use std::sync::Arc;

use bitbench_core::costs::estimate_cost;
use bitbench_core::providers::llm::fake::FakeClient;
use bitbench_core::providers::llm::openrouter::OpenRouterClient;
use bitbench_core::providers::llm::ModelClient;
use bitbench_core::report::console::{
    emit_progress_line, print_model_table, print_ranking, ConsoleObserver,
};
use bitbench_core::report::sink::{publish_all, JsonFileSink, ReportSink};
use bitbench_core::report::write_report;
use bitbench_core::suite::{default_version, load_suite};
use bitbench_core::{Runner, StopSignal};
use tracing::info;

use super::super::args::{Provider, RunArgs};
use super::context::Context;
use crate::exit_codes;

pub async fn run(args: RunArgs, config: Option<&Path>) -> anyhow::Result<i32> {
    let mut ctx = Context::load(config, args.output.output.as_deref())?;
    if let Some(runs) = args.selection.runs {
        ctx.config.runs_per_model = runs;
    }
    if let Some(n) = args.concurrency {
        ctx.config.max_concurrency = n;
    }
    let mut settings = ctx.config.run_settings();
    if let Some(t) = args.timeout {
        settings.timeout = t.into();
    }
    if let Some(s) = args.stagger {
        settings.stagger_delay = s.into();
    }

    let suite = load_suite(&args.selection.suite)?;
    let version = args.version.clone().unwrap_or_else(default_version);
    let models = ctx.models(&args.selection.models)?;

    let client: Arc<dyn ModelClient> = match args.provider {
        Provider::Openrouter => Arc::new(OpenRouterClient::from_env(&ctx.config.api_base_url)?),
        Provider::Fake => Arc::new(FakeClient::new(args.fake_response.clone())),
    };

    info!(
        suite = %suite.id,
        version = %version,
        models = models.len(),
        tests = suite.tests.len(),
        runs = settings.runs_per_model,
        concurrency = settings.max_concurrency,
        provider = client.provider_name(),
        "starting run (upper-bound cost ${:.4})",
        estimate_cost(&models, suite.tests.len(), settings.runs_per_model)
    );

    let runner = Runner::new(ctx.cache.clone(), client, settings);
    let interrupt = tokio::spawn(watch_ctrl_c(runner.stop_signal()));

    let mut rx = runner.subscribe();
    let console = tokio::spawn(async move {
        let mut observer = ConsoleObserver::new();
        while let Some(ev) = rx.recv().await {
            if let Some(line) = observer.observe(&ev.event) {
                emit_progress_line(&line);
            }
        }
        observer
    });

    let result = runner.run(&suite, &version, &models).await;
    runner.bus().close();
    interrupt.abort();
    let observer = console.await;
    let outcome = result?;

    if let Ok(observer) = observer {
        print_model_table(observer.accumulator());
    }
    print_ranking(&outcome.report);

    let path = write_report(&outcome.report, &outcome.rows, &ctx.config.output_dir)?;
    eprintln!("Report written to {}", path.display());

    if !args.no_publish {
        let sinks: Vec<Box<dyn ReportSink>> = vec![Box::new(JsonFileSink::new(
            ctx.config.output_dir.join("latest-report.json"),
        ))];
        publish_all(&sinks, &outcome.report).await;
    }

    if outcome.report.cancelled {
        eprintln!(
            "Cancelled: {} units not run. Rerun the same command to resume from cache.",
            outcome.not_run
        );
        return Ok(exit_codes::CANCELLED);
    }
    let errors = outcome.report.total_errors();
    if errors > 0 {
        eprintln!("{} units failed; rerun to retry them.", errors);
        return Ok(exit_codes::RUN_ERRORS);
    }
    Ok(exit_codes::SUCCESS)
}

/// First Ctrl-C drains the run; a second one exits immediately.
async fn watch_ctrl_c(stop: StopSignal) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    eprintln!("Stopping: waiting for in-flight calls to finish (Ctrl-C again to quit)");
    stop.stop();
    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(exit_codes::CANCELLED);
    }
}
