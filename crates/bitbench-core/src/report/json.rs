use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::summary::BenchmarkReport;
use crate::cache::key::sanitize;
use crate::errors::{BenchError, BenchResult};

/// One terminal unit as it appears in the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRow {
    pub model: String,
    pub test_index: usize,
    pub run_number: u32,
    /// `None` for errored units.
    pub correct: Option<bool>,
    pub cost: f64,
    pub duration_ms: u64,
    pub completion_tokens: u64,
    pub reused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    #[serde(flatten)]
    pub report: BenchmarkReport,
    pub results: Vec<UnitRow>,
}

/// Writes `<dir>/<suite_id>/<version>/test-results-<timestamp>.json`.
pub fn write_report(report: &BenchmarkReport, rows: &[UnitRow], dir: &Path) -> BenchResult<PathBuf> {
    let stamp: String = report
        .timestamp
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    let out = dir
        .join(sanitize(&report.suite_id))
        .join(sanitize(&report.version))
        .join(format!("test-results-{}.json", sanitize(&stamp)));

    let file = ReportFile {
        report: report.clone(),
        results: rows.to_vec(),
    };
    let content = serde_json::to_string_pretty(&file)?;

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
    }
    std::fs::write(&out, content).map_err(|e| BenchError::io(&out, e))?;
    Ok(out)
}

pub fn read_report(path: &Path) -> BenchResult<ReportFile> {
    let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
