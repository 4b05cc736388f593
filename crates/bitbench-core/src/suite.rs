//! Suite definition loading and discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{BenchError, BenchResult};
use crate::model::TestSuite;

#[derive(Debug, Clone)]
pub struct SuiteEntry {
    pub path: PathBuf,
    pub id: String,
    pub suite: TestSuite,
}

/// Parses one suite file. The id is the file stem.
pub fn load_suite(path: impl AsRef<Path>) -> BenchResult<TestSuite> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    let mut suite: TestSuite = serde_json::from_str(&content).map_err(|e| BenchError::Suite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if suite.name.trim().is_empty() {
        return Err(BenchError::Suite {
            path: path.to_path_buf(),
            message: "suite name is empty".into(),
        });
    }

    suite.id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(suite)
}

/// Every `*.json` in `dir` that parses as a suite, sorted by id.
pub fn discover_suites(dir: impl AsRef<Path>) -> BenchResult<Vec<SuiteEntry>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| BenchError::io(dir, e))?;

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        match load_suite(&path) {
            Ok(suite) => out.push(SuiteEntry {
                id: suite.id.clone(),
                path,
                suite,
            }),
            Err(e) => debug!(path = %path.display(), error = %e, "skipping non-suite file"),
        }
    }
    out.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(out)
}

/// Version label used when the caller does not pin one: today's local date.
pub fn default_version() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
