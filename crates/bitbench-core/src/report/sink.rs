//! Publishing sinks for finished reports.
//!
//! Sinks run after the scheduler is done and cannot affect it; a failing sink
//! is logged and skipped.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use super::summary::BenchmarkReport;

#[async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, report: &BenchmarkReport) -> anyhow::Result<()>;
}

/// Writes the report as pretty JSON to a fixed path (e.g. `latest-report.json`).
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn publish(&self, report: &BenchmarkReport) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(report)?;
        crate::cache::io::write_atomic(&self.path, &content).await?;
        Ok(())
    }
}

/// Hands `report` to every sink; returns how many succeeded.
pub async fn publish_all(sinks: &[Box<dyn ReportSink>], report: &BenchmarkReport) -> usize {
    let mut ok = 0;
    for sink in sinks {
        match sink.publish(report).await {
            Ok(()) => {
                info!(sink = sink.name(), "report published");
                ok += 1;
            }
            Err(e) => warn!(sink = sink.name(), error = %e, "report sink failed"),
        }
    }
    ok
}
