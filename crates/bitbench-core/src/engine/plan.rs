//! Plan construction: validation, unit expansion and the cache pre-pass.

use std::collections::HashSet;

use tracing::debug;

use crate::cache::{CacheKey, ResultCache};
use crate::errors::{BenchError, BenchResult};
use crate::fingerprint;
use crate::model::{CachedResult, ExecutionUnit, RunSettings, RunnableModel, TestSuite};
use crate::report::progress::PlanTotals;

#[derive(Debug, Clone)]
pub struct PlannedUnit {
    pub unit: ExecutionUnit,
    pub key: CacheKey,
    pub fingerprint: String,
    /// Valid cache entry found by the pre-pass.
    pub cached: Option<CachedResult>,
}

#[derive(Debug, Clone)]
pub struct RunPlan {
    /// The suite with `version` set to the run's version label.
    pub suite: TestSuite,
    pub models: Vec<RunnableModel>,
    /// Model-major, then run number, then test index.
    pub units: Vec<PlannedUnit>,
    pub totals: Vec<PlanTotals>,
}

impl RunPlan {
    pub fn total_units(&self) -> usize {
        self.units.len()
    }

    pub fn execute_count(&self) -> usize {
        self.totals.iter().map(|t| t.execute).sum()
    }
}

/// Rejects plans that would produce an empty or ambiguous report.
pub fn validate(
    suite: &TestSuite,
    version: &str,
    models: &[RunnableModel],
    settings: &RunSettings,
) -> BenchResult<()> {
    if suite.id.trim().is_empty() {
        return Err(BenchError::plan("suite has no id"));
    }
    if version.trim().is_empty() {
        return Err(BenchError::plan("version label is empty"));
    }
    if models.is_empty() {
        return Err(BenchError::plan("no active models"));
    }
    if suite.tests.is_empty() {
        return Err(BenchError::plan(format!(
            "suite '{}' has no tests",
            suite.id
        )));
    }
    if settings.runs_per_model == 0 {
        return Err(BenchError::plan("runs_per_model must be at least 1"));
    }
    if settings.max_concurrency == 0 {
        return Err(BenchError::plan("max_concurrency must be at least 1"));
    }
    let mut seen = HashSet::new();
    for m in models {
        if !seen.insert(m.name.as_str()) {
            return Err(BenchError::plan(format!("duplicate model: {}", m.name)));
        }
    }
    Ok(())
}

/// Expands models × runs × tests and probes the cache for every unit.
pub async fn build_plan(
    cache: &ResultCache,
    suite: &TestSuite,
    version: &str,
    models: &[RunnableModel],
    settings: &RunSettings,
) -> BenchResult<RunPlan> {
    validate(suite, version, models, settings)?;

    let mut suite = suite.clone();
    suite.version = version.to_string();

    let mut units = Vec::with_capacity(models.len() * suite.tests.len() * settings.runs_per_model as usize);
    let mut totals = Vec::with_capacity(models.len());

    for (model_index, model) in models.iter().enumerate() {
        let mut t = PlanTotals {
            model: model.name.clone(),
            total: 0,
            execute: 0,
            reuse: 0,
        };
        for run_number in 1..=settings.runs_per_model {
            for test_index in 0..suite.tests.len() {
                let unit = ExecutionUnit {
                    model: model.name.clone(),
                    model_index,
                    test_index,
                    run_number,
                };
                let fp = fingerprint::compute(&unit, &suite);
                let key = CacheKey::new(&suite.id, version, &model.name, run_number, test_index);
                let cached = cache.lookup(&key, &fp.hex).await;

                t.total += 1;
                if cached.is_some() {
                    t.reuse += 1;
                } else {
                    t.execute += 1;
                }
                units.push(PlannedUnit {
                    unit,
                    key,
                    fingerprint: fp.hex,
                    cached,
                });
            }
        }
        debug!(model = %t.model, total = t.total, execute = t.execute, reuse = t.reuse, "planned");
        totals.push(t);
    }

    Ok(RunPlan {
        suite,
        models: models.to_vec(),
        units,
        totals,
    })
}
