//! Benchmark execution engine for BitBench.
//!
//! Runs Q&A test suites against hosted language models with bounded
//! concurrency, reuses previously computed results through a fingerprinted
//! on-disk cache, and folds the resulting event stream into a ranked report.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bitbench_core::{catalog, suite, BenchConfig, ResultCache, Runner};
//! use bitbench_core::providers::llm::openrouter::OpenRouterClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cfg = BenchConfig::from_env()?;
//! let suite = suite::load_suite("tests/bsv-basics.json")?;
//! let models = catalog::select_models(&catalog::default_catalog(), &["gpt-4o".into()])?;
//! let client = Arc::new(OpenRouterClient::from_env(&cfg.api_base_url)?);
//! let runner = Runner::new(ResultCache::new(cfg.cache_dir()), client, cfg.run_settings());
//! let outcome = runner.run(&suite, "2026-01-01", &models).await?;
//! println!("{}", outcome.report.metadata.overall_success_rate);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod costs;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod grading;
pub mod model;
pub mod providers;
pub mod report;
pub mod suite;

pub use cache::ResultCache;
pub use config::BenchConfig;
pub use engine::runner::{RunOutcome, Runner};
pub use engine::stop::StopSignal;
pub use errors::{BenchError, BenchResult};
pub use model::{CachedResult, ExecutionUnit, RunSettings, RunnableModel, TestCase, TestSuite};
pub use report::progress::{EventBus, RunnerEvent};
pub use report::summary::BenchmarkReport;
