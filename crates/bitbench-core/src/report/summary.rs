//! Final ranked report.

use serde::{Deserialize, Serialize};

use super::aggregate::RunAccumulator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub model: String,
    pub correct: usize,
    pub incorrect: usize,
    pub errors: usize,
    /// Planned units for the model.
    pub total_tests: usize,
    /// Unrounded percentage over graded answers.
    pub success_rate: f64,
    pub total_cost: f64,
    pub tokens_per_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub total_models: usize,
    pub total_tests_run: usize,
    pub overall_success_rate: f64,
    pub total_cost: f64,
}

/// Aggregate of one (possibly partial) run. Not authoritative: the cache is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub suite_id: String,
    pub suite_name: String,
    pub chain: String,
    pub version: String,
    pub timestamp: String,
    pub rankings: Vec<Ranking>,
    pub metadata: ReportMetadata,
    /// The run was stopped before every unit was dispatched.
    #[serde(default)]
    pub cancelled: bool,
}

pub struct ReportHeader {
    pub suite_id: String,
    pub suite_name: String,
    pub chain: String,
    pub version: String,
    pub timestamp: String,
}

impl BenchmarkReport {
    /// Builds rankings in plan order, then stable-sorts by success rate, so
    /// ties keep their plan order.
    pub fn build(header: ReportHeader, acc: &RunAccumulator, cancelled: bool) -> Self {
        let mut rankings: Vec<Ranking> = acc
            .iter()
            .map(|(model, s)| Ranking {
                model: model.to_string(),
                correct: s.correct,
                incorrect: s.incorrect,
                errors: s.executed_errors,
                total_tests: s.total,
                success_rate: s.success_rate(),
                total_cost: s.cost_sum,
                tokens_per_second: s.tokens_per_second(),
            })
            .collect();
        rankings.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let totals = acc.totals();
        Self {
            suite_id: header.suite_id,
            suite_name: header.suite_name,
            chain: header.chain,
            version: header.version,
            timestamp: header.timestamp,
            metadata: ReportMetadata {
                total_models: rankings.len(),
                total_tests_run: totals.total,
                overall_success_rate: totals.success_rate(),
                total_cost: totals.cost_sum,
            },
            rankings,
            cancelled,
        }
    }

    pub fn ranking(&self, model: &str) -> Option<&Ranking> {
        self.rankings.iter().find(|r| r.model == model)
    }

    pub fn total_errors(&self) -> usize {
        self.rankings.iter().map(|r| r.errors).sum()
    }
}
