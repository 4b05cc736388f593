//! Per-model cost table and run cost estimates.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{io, ResultCache};
use crate::errors::{BenchError, BenchResult};
use crate::model::{default_cost_per_test, CachedResult, RunnableModel};
use crate::report::progress::PlanTotals;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostMeta {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub sample_count: BTreeMap<String, usize>,
}

/// Average USD cost per test, keyed by model name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    #[serde(rename = "_meta", default)]
    pub meta: CostMeta,
    #[serde(default)]
    pub costs: BTreeMap<String, f64>,
}

impl CostTable {
    /// Missing file yields an empty table.
    pub fn load(path: &Path) -> BenchResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cost table, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(BenchError::io(path, e)),
        };
        serde_json::from_str(&content)
            .map_err(|e| BenchError::config(format!("cost table {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> BenchResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        io::write_atomic_blocking(path, &content).map_err(|e| match e {
            crate::errors::CacheError::Io { path, source } => BenchError::io(path, source),
            crate::errors::CacheError::Serialize(e) => BenchError::Json(e),
        })
    }

    pub fn cost_for(&self, model: &str) -> f64 {
        self.costs
            .get(model)
            .copied()
            .unwrap_or_else(default_cost_per_test)
    }

    pub fn apply_to(&self, models: &mut [RunnableModel]) {
        for m in models.iter_mut() {
            m.avg_cost_per_test = self.cost_for(&m.name);
        }
    }

    /// Merges per-model averages of positive costs into the table.
    ///
    /// Models without samples keep their existing entry. Returns the number of
    /// models updated.
    pub fn update_from_results<'a>(
        &mut self,
        results: impl IntoIterator<Item = &'a CachedResult>,
        today: &str,
    ) -> usize {
        let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for r in results {
            if r.cost_usd > 0.0 && r.cost_usd.is_finite() {
                samples.entry(r.model.clone()).or_default().push(r.cost_usd);
            }
        }

        for (model, costs) in &samples {
            let avg = costs.iter().sum::<f64>() / costs.len() as f64;
            self.costs.insert(model.clone(), round4(avg));
        }

        self.meta = CostMeta {
            description: "Average cost per test execution for each model. Updated after benchmark runs."
                .into(),
            last_updated: today.to_string(),
            source: "Aggregated from cached benchmark results".into(),
            sample_count: samples.iter().map(|(m, c)| (m.clone(), c.len())).collect(),
        };
        samples.len()
    }

    /// Rebuilds averages from every result in `cache` and saves to `path`.
    pub async fn update_from_cache(cache: &ResultCache, path: &Path) -> BenchResult<(Self, usize)> {
        let mut table = Self::load(path)?;
        let results = cache.list_all().await;
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let updated = table.update_from_results(&results, &today);
        table.save(path)?;
        info!(
            path = %path.display(),
            updated,
            total = table.costs.len(),
            "cost table updated"
        );
        Ok((table, updated))
    }

    /// Entries sorted by cost, most expensive first.
    pub fn most_expensive(&self, n: usize) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> =
            self.costs.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries.truncate(n);
        entries
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Upper bound for running every test of `models` `runs_per_model` times.
pub fn estimate_cost(models: &[RunnableModel], num_tests: usize, runs_per_model: u32) -> f64 {
    models
        .iter()
        .map(|m| m.avg_cost_per_test * num_tests as f64 * f64::from(runs_per_model))
        .sum()
}

/// Cost of only the units a plan will actually execute.
pub fn estimate_remaining_cost(models: &[RunnableModel], totals: &[PlanTotals]) -> f64 {
    totals
        .iter()
        .map(|t| {
            let per_test = models
                .iter()
                .find(|m| m.name == t.model)
                .map(|m| m.avg_cost_per_test)
                .unwrap_or_else(default_cost_per_test);
            per_test * t.execute as f64
        })
        .sum()
}
