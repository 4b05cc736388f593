use crate::report::aggregate::{ModelStats, RunAccumulator};
use crate::report::progress::RunnerEvent;
use crate::report::summary::BenchmarkReport;
use std::time::{Duration, Instant};

// --- Progress N/M (throttled, completion-order) ---

/// Format a single progress line for display. Deterministic, unit-testable.
#[must_use]
pub fn format_progress_line(done: usize, total: usize, running: usize, errors: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    };
    let mut line = format!("Progress {}/{} ({:.0}%), {} running", done, total, pct, running);
    if errors > 0 {
        line.push_str(&format!(", {} errors", errors));
    }
    line
}

/// Write a progress line to stderr.
pub fn emit_progress_line(line: &str) {
    eprintln!("{}", line);
}

/// Minimum interval between progress updates to avoid log spam.
const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

/// For large runs, emit at most every this many units (10% steps).
pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 10 {
        1
    } else {
        std::cmp::max(1, total / 10)
    }
}

/// Folds the event stream for display and decides when a progress line is due.
/// Always emits on the final unit.
pub struct ConsoleObserver {
    acc: RunAccumulator,
    step: usize,
    last_emit: Option<Instant>,
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            acc: RunAccumulator::new(),
            step: 1,
            last_emit: None,
        }
    }

    pub fn accumulator(&self) -> &RunAccumulator {
        &self.acc
    }

    /// Applies `event`; returns a line when one should be printed.
    pub fn observe(&mut self, event: &RunnerEvent) -> Option<String> {
        self.acc.apply(event);
        let totals = self.acc.totals();
        match event {
            RunnerEvent::Plan { .. } => {
                self.step = progress_step(totals.total);
                Some(format!(
                    "Plan: {} units, {} to execute, {} from cache",
                    totals.total, totals.execute_total, totals.reuse_total
                ))
            }
            RunnerEvent::Start { .. } => None,
            _ => {
                let done = totals.finished();
                let now = Instant::now();
                let emit_final = done == totals.total;
                let emit_step = done % self.step == 0 || done == 1;
                let interval_ok = self
                    .last_emit
                    .map(|t| {
                        now.saturating_duration_since(t)
                            >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
                    })
                    .unwrap_or(true);
                if emit_final || (emit_step && interval_ok) {
                    self.last_emit = Some(now);
                    Some(format_progress_line(
                        done,
                        totals.total,
                        totals.running(),
                        totals.executed_errors,
                    ))
                } else {
                    None
                }
            }
        }
    }
}

fn opt(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| "-".into())
}

fn model_row(name: &str, s: &ModelStats) -> [String; 10] {
    [
        name.to_string(),
        format!("{}/{}", s.reuse_completed + s.executed_done, s.total),
        if s.answered() > 0 {
            format!("{:.0}%", s.success_rate())
        } else {
            "-".into()
        },
        match s.executed_errors {
            0 => "-".into(),
            n => n.to_string(),
        },
        match s.running() {
            0 => "-".into(),
            n => n.to_string(),
        },
        opt(s.avg_cost(), |c| format!("${:.4}", c)),
        opt(s.avg_tokens(), |t| format!("{:.0}", t)),
        if s.duration_sum_ms > 0 {
            format!("{:.1}", s.tokens_per_second())
        } else {
            "-".into()
        },
        opt(s.avg_duration_ms(), |d| format!("{:.1}s", d / 1000.0)),
        if s.max_duration_ms > 0 {
            format!("{:.1}s", s.max_duration_ms as f64 / 1000.0)
        } else {
            "-".into()
        },
    ]
}

/// Per-model status table in plan order.
pub fn format_model_table(acc: &RunAccumulator) -> String {
    const HEADERS: [&str; 10] = [
        "Model", "Done", "% Right", "Err", "Run", "Avg Cost", "Avg Tok", "TPS", "Avg Dur",
        "Slowest",
    ];
    let rows: Vec<[String; 10]> = acc.iter().map(|(m, s)| model_row(m, s)).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let fmt_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (c, w))| {
                if i == 0 {
                    format!("{:<w$}", c, w = *w)
                } else {
                    format!("{:>w$}", c, w = *w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![fmt_row(HEADERS.to_vec())];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for r in &rows {
        out.push(fmt_row(r.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

pub fn print_model_table(acc: &RunAccumulator) {
    eprintln!();
    eprintln!("{}", format_model_table(acc));
}

pub fn format_ranking(report: &BenchmarkReport) -> String {
    let mut lines = Vec::new();
    let status = if report.cancelled { " (cancelled)" } else { "" };
    lines.push(format!(
        "{} [{}] v{}{}",
        report.suite_name, report.chain, report.version, status
    ));
    for (i, r) in report.rankings.iter().enumerate() {
        let errors = if r.errors > 0 {
            format!(", {} errors", r.errors)
        } else {
            String::new()
        };
        lines.push(format!(
            "{:>3}. {:<32} {:>5.1}%  ({}/{} correct{})  ${:.4}  {:.1} tok/s",
            i + 1,
            r.model,
            r.success_rate,
            r.correct,
            r.correct + r.incorrect,
            errors,
            r.total_cost,
            r.tokens_per_second
        ));
    }
    lines.push("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".into());
    lines.push(format!(
        "Summary: {} models, {} tests, {:.1}% overall, ${:.4} total cost",
        report.metadata.total_models,
        report.metadata.total_tests_run,
        report.metadata.overall_success_rate,
        report.metadata.total_cost
    ));
    lines.join("\n")
}

pub fn print_ranking(report: &BenchmarkReport) {
    eprintln!();
    eprintln!("{}", format_ranking(report));
}
