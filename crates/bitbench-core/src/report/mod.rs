pub mod aggregate;
pub mod breakdown;
pub mod console;
pub mod json;
pub mod progress;
pub mod sink;
pub mod summary;

pub use aggregate::{ModelStats, RunAccumulator};
pub use json::{write_report, UnitRow};
pub use summary::{BenchmarkReport, Ranking, ReportMetadata};
