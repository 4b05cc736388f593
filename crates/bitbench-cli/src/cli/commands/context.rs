//! Shared setup: resolved config, cache handle and priced model selection.

use std::path::Path;

use bitbench_core::catalog::{default_catalog, select_models};
use bitbench_core::costs::CostTable;
use bitbench_core::{BenchConfig, BenchResult, ResultCache, RunnableModel};
use tracing::debug;

pub struct Context {
    pub config: BenchConfig,
    pub cache: ResultCache,
}

impl Context {
    /// Config file and environment, then `--output` on top.
    pub fn load(config_path: Option<&Path>, output: Option<&Path>) -> BenchResult<Self> {
        let mut config = BenchConfig::load(config_path)?;
        if let Some(dir) = output {
            config.output_dir = dir.to_path_buf();
        }
        debug!(output_dir = %config.output_dir.display(), "config resolved");
        let cache = ResultCache::new(config.cache_dir());
        Ok(Self { config, cache })
    }

    pub fn cost_table(&self) -> BenchResult<CostTable> {
        CostTable::load(&self.config.cost_file())
    }

    /// Catalog models named by `names` (all when empty) with observed costs applied.
    pub fn models(&self, names: &[String]) -> BenchResult<Vec<RunnableModel>> {
        let mut models = select_models(&default_catalog(), names)?;
        self.cost_table()?.apply_to(&mut models);
        Ok(models)
    }

    pub fn runs(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.config.runs_per_model)
    }
}
