//! Fold of the event stream into per-model counters.
//!
//! The accumulator is owned by one consumer and updated sequentially; model
//! calls may run in parallel but nothing here is shared between them.

use std::collections::HashMap;

use serde::Serialize;

use super::json::UnitRow;
use super::progress::RunnerEvent;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelStats {
    /// Planned units.
    pub total: usize,
    pub execute_total: usize,
    pub reuse_total: usize,
    pub reuse_completed: usize,
    pub executed_started: usize,
    pub executed_done: usize,
    pub executed_errors: usize,
    /// Over done, error and reuse events.
    pub duration_sum_ms: u64,
    pub max_duration_ms: u64,
    pub correct: usize,
    pub incorrect: usize,
    pub cost_sum: f64,
    pub completion_tokens_sum: u64,
}

impl ModelStats {
    /// Units in a terminal state.
    pub fn finished(&self) -> usize {
        self.reuse_completed + self.executed_done + self.executed_errors
    }

    /// Units that produced a graded answer.
    pub fn answered(&self) -> usize {
        self.correct + self.incorrect
    }

    pub fn running(&self) -> usize {
        self.executed_started
            .saturating_sub(self.executed_done + self.executed_errors)
    }

    /// Percentage over graded answers; errors are not in the denominator.
    pub fn success_rate(&self) -> f64 {
        match self.answered() {
            0 => 0.0,
            n => self.correct as f64 / n as f64 * 100.0,
        }
    }

    pub fn tokens_per_second(&self) -> f64 {
        if self.duration_sum_ms == 0 {
            0.0
        } else {
            self.completion_tokens_sum as f64 / (self.duration_sum_ms as f64 / 1000.0)
        }
    }

    pub fn avg_cost(&self) -> Option<f64> {
        let n = self.reuse_completed + self.executed_done;
        (n > 0).then(|| self.cost_sum / n as f64)
    }

    pub fn avg_tokens(&self) -> Option<f64> {
        let n = self.reuse_completed + self.executed_done;
        (n > 0).then(|| self.completion_tokens_sum as f64 / n as f64)
    }

    pub fn avg_duration_ms(&self) -> Option<f64> {
        let n = self.finished();
        (n > 0).then(|| self.duration_sum_ms as f64 / n as f64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunAccumulator {
    order: Vec<String>,
    stats: HashMap<String, ModelStats>,
    rows: Vec<UnitRow>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models in plan order (first appearance for models the plan did not name).
    pub fn model_order(&self) -> &[String] {
        &self.order
    }

    pub fn stats(&self, model: &str) -> Option<&ModelStats> {
        self.stats.get(model)
    }

    /// (model, stats) in plan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelStats)> + '_ {
        self.order
            .iter()
            .filter_map(|m| self.stats.get(m).map(|s| (m.as_str(), s)))
    }

    /// One row per terminal unit, in event order.
    pub fn rows(&self) -> &[UnitRow] {
        &self.rows
    }

    pub fn totals(&self) -> ModelStats {
        let mut t = ModelStats::default();
        for s in self.stats.values() {
            t.total += s.total;
            t.execute_total += s.execute_total;
            t.reuse_total += s.reuse_total;
            t.reuse_completed += s.reuse_completed;
            t.executed_started += s.executed_started;
            t.executed_done += s.executed_done;
            t.executed_errors += s.executed_errors;
            t.duration_sum_ms += s.duration_sum_ms;
            t.max_duration_ms = t.max_duration_ms.max(s.max_duration_ms);
            t.correct += s.correct;
            t.incorrect += s.incorrect;
            t.cost_sum += s.cost_sum;
            t.completion_tokens_sum += s.completion_tokens_sum;
        }
        t
    }

    fn entry(&mut self, model: &str) -> &mut ModelStats {
        if !self.stats.contains_key(model) {
            self.order.push(model.to_string());
        }
        self.stats.entry(model.to_string()).or_default()
    }

    pub fn apply(&mut self, event: &RunnerEvent) {
        match event {
            RunnerEvent::Plan { totals, .. } => {
                for t in totals {
                    let s = self.entry(&t.model);
                    s.total = t.total;
                    s.execute_total = t.execute;
                    s.reuse_total = t.reuse;
                }
            }
            RunnerEvent::Start { model, .. } => {
                self.entry(model).executed_started += 1;
            }
            RunnerEvent::Done {
                model,
                test_index,
                run_number,
                duration_ms,
                correct,
                cost_usd,
                completion_tokens,
            } => {
                let s = self.entry(model);
                s.executed_done += 1;
                record_answer(s, *duration_ms, *correct, *cost_usd, *completion_tokens);
                self.rows.push(UnitRow {
                    model: model.clone(),
                    test_index: *test_index,
                    run_number: *run_number,
                    correct: Some(*correct),
                    cost: *cost_usd,
                    duration_ms: *duration_ms,
                    completion_tokens: *completion_tokens,
                    reused: false,
                    error: None,
                });
            }
            RunnerEvent::Error {
                model,
                test_index,
                run_number,
                duration_ms,
                message,
                ..
            } => {
                let s = self.entry(model);
                s.executed_errors += 1;
                s.duration_sum_ms += duration_ms;
                s.max_duration_ms = s.max_duration_ms.max(*duration_ms);
                self.rows.push(UnitRow {
                    model: model.clone(),
                    test_index: *test_index,
                    run_number: *run_number,
                    correct: None,
                    cost: 0.0,
                    duration_ms: *duration_ms,
                    completion_tokens: 0,
                    reused: false,
                    error: Some(message.clone()),
                });
            }
            RunnerEvent::Reuse {
                model,
                test_index,
                run_number,
                duration_ms,
                correct,
                cost_usd,
                completion_tokens,
            } => {
                let s = self.entry(model);
                s.reuse_completed += 1;
                record_answer(s, *duration_ms, *correct, *cost_usd, *completion_tokens);
                self.rows.push(UnitRow {
                    model: model.clone(),
                    test_index: *test_index,
                    run_number: *run_number,
                    correct: Some(*correct),
                    cost: *cost_usd,
                    duration_ms: *duration_ms,
                    completion_tokens: *completion_tokens,
                    reused: true,
                    error: None,
                });
            }
        }
    }
}

fn record_answer(s: &mut ModelStats, duration_ms: u64, correct: bool, cost: f64, tokens: u64) {
    s.duration_sum_ms += duration_ms;
    s.max_duration_ms = s.max_duration_ms.max(duration_ms);
    if correct {
        s.correct += 1;
    } else {
        s.incorrect += 1;
    }
    s.cost_sum += cost;
    s.completion_tokens_sum += tokens;
}
