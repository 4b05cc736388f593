use crate::cache::ResultCache;
use crate::engine::invoker::invoke;
use crate::engine::plan::{build_plan, PlannedUnit, RunPlan};
use crate::engine::stop::StopSignal;
use crate::errors::BenchResult;
use crate::grading::grade;
use crate::model::{CachedResult, GradedText, RunSettings, RunnableModel, TestSuite, CACHE_VERSION};
use crate::providers::llm::ModelClient;
use crate::report::aggregate::RunAccumulator;
use crate::report::json::UnitRow;
use crate::report::progress::{EventBus, RunnerEvent, SequencedEvent};
use crate::report::summary::{BenchmarkReport, ReportHeader};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: BenchmarkReport,
    /// Terminal units in event order.
    pub rows: Vec<UnitRow>,
    /// Units never started because the run was stopped.
    pub not_run: usize,
}

pub struct Runner {
    pub cache: ResultCache,
    pub client: Arc<dyn ModelClient>,
    pub settings: RunSettings,
    bus: EventBus,
    stop: StopSignal,
}

/// Everything one unit task needs, cloned once per run.
#[derive(Clone)]
struct UnitContext {
    cache: ResultCache,
    client: Arc<dyn ModelClient>,
    bus: EventBus,
    suite: Arc<TestSuite>,
    settings: RunSettings,
}

impl Runner {
    pub fn new(cache: ResultCache, client: Arc<dyn ModelClient>, settings: RunSettings) -> Self {
        Self {
            cache,
            client,
            settings,
            bus: EventBus::new(),
            stop: StopSignal::new(),
        }
    }

    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Registers an observer for every event of subsequent runs.
    pub fn subscribe(&self) -> UnboundedReceiver<SequencedEvent> {
        self.bus.subscribe()
    }

    /// Runs `models` over `suite` under `version`.
    ///
    /// Fails only when the plan is invalid, before any event is emitted.
    /// Per-unit failures become `error` events and still yield a report.
    pub async fn run(
        &self,
        suite: &TestSuite,
        version: &str,
        models: &[RunnableModel],
    ) -> BenchResult<RunOutcome> {
        let plan = build_plan(&self.cache, suite, version, models, &self.settings).await?;
        let mut events = self.bus.subscribe();

        info!(
            suite = %plan.suite.id,
            version,
            models = plan.models.len(),
            units = plan.total_units(),
            execute = plan.execute_count(),
            "starting run"
        );
        self.bus.emit(RunnerEvent::Plan {
            suite_id: plan.suite.id.clone(),
            version: version.to_string(),
            totals: plan.totals.clone(),
        });

        let not_run = self.dispatch(&plan).await;

        let mut acc = RunAccumulator::new();
        while let Ok(ev) = events.try_recv() {
            acc.apply(&ev.event);
        }

        let cancelled = not_run > 0;
        if cancelled {
            warn!(not_run, "run stopped before all units were dispatched");
        }

        let report = BenchmarkReport::build(
            ReportHeader {
                suite_id: plan.suite.id.clone(),
                suite_name: plan.suite.name.clone(),
                chain: plan.suite.chain.clone(),
                version: version.to_string(),
                timestamp: now_rfc3339(),
            },
            &acc,
            cancelled,
        );
        Ok(RunOutcome {
            rows: acc.rows().to_vec(),
            report,
            not_run,
        })
    }

    /// Drives every unit to a terminal state; returns how many were skipped
    /// because of a stop request.
    async fn dispatch(&self, plan: &RunPlan) -> usize {
        let ctx = UnitContext {
            cache: self.cache.clone(),
            client: self.client.clone(),
            bus: self.bus.clone(),
            suite: Arc::new(plan.suite.clone()),
            settings: self.settings.clone(),
        };

        // Stagger slot per model, counting only models that execute anything.
        let stagger_rank: HashMap<&str, u32> = plan
            .totals
            .iter()
            .filter(|t| t.execute > 0)
            .zip(0u32..)
            .map(|(t, k)| (t.model.as_str(), k))
            .collect();

        let started = Instant::now();
        let sem = Arc::new(Semaphore::new(self.settings.max_concurrency));
        let mut join_set = JoinSet::new();
        let mut not_run = 0;

        for pu in &plan.units {
            if let Some(cached) = &pu.cached {
                // Reuses bypass the cap; they never touch the backend.
                emit_reuse(&self.bus, pu, cached);
                continue;
            }
            if self.stop.is_stopped() {
                not_run += 1;
                continue;
            }

            let rank = stagger_rank.get(pu.unit.model.as_str()).copied().unwrap_or(0);
            let not_before = started + self.settings.stagger_delay * rank;
            if Instant::now() < not_before {
                tokio::select! {
                    biased;
                    _ = self.stop.stopped() => {
                        not_run += 1;
                        continue;
                    }
                    _ = tokio::time::sleep_until(not_before) => {}
                }
            }

            let permit = tokio::select! {
                biased;
                _ = self.stop.stopped() => None,
                p = sem.clone().acquire_owned() => p.ok(),
            };
            let Some(permit) = permit else {
                not_run += 1;
                continue;
            };

            let Some(model) = plan.models.get(pu.unit.model_index).cloned() else {
                not_run += 1;
                continue;
            };
            let ctx = ctx.clone();
            let pu = pu.clone();
            join_set.spawn(async move {
                let _permit = permit;
                execute_unit(&ctx, &model, &pu).await;
            });
        }

        while let Some(res) = join_set.join_next().await {
            if let Err(e) = res {
                warn!(error = %e, "unit task failed to complete");
            }
        }
        not_run
    }
}

fn emit_reuse(bus: &EventBus, pu: &PlannedUnit, cached: &CachedResult) {
    debug!(
        model = %pu.unit.model,
        test_index = pu.unit.test_index,
        run_number = pu.unit.run_number,
        "reusing cached result"
    );
    bus.emit(RunnerEvent::Reuse {
        model: pu.unit.model.clone(),
        test_index: pu.unit.test_index,
        run_number: pu.unit.run_number,
        duration_ms: cached.duration_ms,
        correct: cached.result.correct,
        cost_usd: cached.cost_usd,
        completion_tokens: cached.completion_tokens,
    });
}

async fn execute_unit(ctx: &UnitContext, model: &RunnableModel, pu: &PlannedUnit) {
    let unit = &pu.unit;
    let Some(tc) = ctx.suite.tests.get(unit.test_index) else {
        return;
    };

    ctx.bus.emit(RunnerEvent::Start {
        model: unit.model.clone(),
        test_index: unit.test_index,
        run_number: unit.run_number,
    });

    match invoke(
        ctx.client.as_ref(),
        model,
        &ctx.suite.system_prompt,
        &tc.prompt,
        ctx.settings.timeout,
    )
    .await
    {
        Ok(inv) => {
            let correct = grade(&inv.text, &tc.answers, &tc.negative_answers);
            let result = CachedResult {
                cache_version: CACHE_VERSION,
                timestamp: now_rfc3339(),
                suite_id: ctx.suite.id.clone(),
                suite_name: ctx.suite.name.clone(),
                version: ctx.suite.version.clone(),
                model: unit.model.clone(),
                run_number: unit.run_number,
                test_index: unit.test_index,
                system_prompt: ctx.suite.system_prompt.clone(),
                prompt: tc.prompt.clone(),
                answers: tc.answers.clone(),
                negative_answers: tc.negative_answers.clone(),
                duration_ms: inv.duration_ms,
                cost_usd: inv.cost_usd,
                completion_tokens: inv.completion_tokens,
                signature: pu.fingerprint.clone(),
                result: GradedText {
                    text: inv.text,
                    correct,
                },
            };
            // Best effort: the unit still counts as done without persistence.
            if let Err(e) = ctx.cache.store(&result).await {
                warn!(
                    model = %unit.model,
                    test_index = unit.test_index,
                    run_number = unit.run_number,
                    error = %e,
                    "failed to cache result"
                );
            }
            ctx.bus.emit(RunnerEvent::Done {
                model: unit.model.clone(),
                test_index: unit.test_index,
                run_number: unit.run_number,
                duration_ms: inv.duration_ms,
                correct,
                cost_usd: inv.cost_usd,
                completion_tokens: inv.completion_tokens,
            });
        }
        Err(e) => {
            warn!(
                model = %unit.model,
                test_index = unit.test_index,
                run_number = unit.run_number,
                kind = e.kind.as_str(),
                "invocation failed: {}",
                e.message
            );
            ctx.bus.emit(RunnerEvent::Error {
                model: unit.model.clone(),
                test_index: unit.test_index,
                run_number: unit.run_number,
                duration_ms: e.duration_ms,
                kind: e.kind,
                message: e.message,
            });
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
