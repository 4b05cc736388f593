use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{BenchError, BenchResult};
use crate::model::RunSettings;

/// File name looked up in the working directory when no config is passed.
pub const DEFAULT_CONFIG_FILE: &str = "bitbench.yaml";

/// Benchmark configuration.
///
/// Resolution order: defaults, then an optional YAML file, then environment
/// variables. CLI flags are applied on top by the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Root for the result cache and report files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Global cap on in-flight model calls.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_runs_per_model")]
    pub runs_per_model: u32,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between successive models' first calls, in milliseconds.
    #[serde(default = "default_stagger_delay_ms")]
    pub stagger_delay_ms: u64,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Cost table location; defaults to `<output_dir>/model-costs.json`.
    #[serde(default)]
    pub cost_file: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./results")
}

fn default_max_concurrency() -> usize {
    40
}

fn default_runs_per_model() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    400
}

fn default_stagger_delay_ms() -> u64 {
    150
}

fn default_api_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_concurrency: default_max_concurrency(),
            runs_per_model: default_runs_per_model(),
            timeout_secs: default_timeout_secs(),
            stagger_delay_ms: default_stagger_delay_ms(),
            api_base_url: default_api_base_url(),
            cost_file: None,
        }
    }
}

impl BenchConfig {
    /// Defaults overlaid with environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `BITBENCH_OUTPUT_DIR` | `output_dir` |
    /// | `BITBENCH_MAX_CONCURRENCY` | `max_concurrency` |
    /// | `BITBENCH_RUNS_PER_MODEL` | `runs_per_model` |
    /// | `BITBENCH_TIMEOUT_SECS` | `timeout_secs` |
    /// | `BITBENCH_STAGGER_MS` | `stagger_delay_ms` |
    /// | `OPENROUTER_BASE_URL` | `api_base_url` |
    ///
    /// A variable that is set but does not parse is a config error.
    pub fn from_env() -> BenchResult<Self> {
        Self::default().with_env()
    }

    /// Reads `path` (YAML) if given, else `bitbench.yaml` when present, then
    /// applies the environment.
    pub fn load(path: Option<&Path>) -> BenchResult<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        base.with_env()
    }

    pub fn from_file(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| BenchError::config(format!("{}: {}", path.display(), e)))
    }

    fn with_env(mut self) -> BenchResult<Self> {
        if let Ok(v) = std::env::var("BITBENCH_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env_parse("BITBENCH_MAX_CONCURRENCY")? {
            self.max_concurrency = v;
        }
        if let Some(v) = env_parse("BITBENCH_RUNS_PER_MODEL")? {
            self.runs_per_model = v;
        }
        if let Some(v) = env_parse("BITBENCH_TIMEOUT_SECS")? {
            self.timeout_secs = v;
        }
        if let Some(v) = env_parse("BITBENCH_STAGGER_MS")? {
            self.stagger_delay_ms = v;
        }
        if let Ok(v) = std::env::var("OPENROUTER_BASE_URL") {
            self.api_base_url = v;
        }
        Ok(self)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.output_dir.join("cache")
    }

    pub fn cost_file(&self) -> PathBuf {
        self.cost_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("model-costs.json"))
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            runs_per_model: self.runs_per_model,
            max_concurrency: self.max_concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            stagger_delay: Duration::from_millis(self.stagger_delay_ms),
        }
    }
}

/// `Ok(None)` when unset; a set but unparsable value is rejected.
fn env_parse<T: std::str::FromStr>(key: &str) -> BenchResult<Option<T>> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BenchError::config(format!("{key}: invalid value {v:?}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const VARS: &[&str] = &[
        "BITBENCH_OUTPUT_DIR",
        "BITBENCH_MAX_CONCURRENCY",
        "BITBENCH_RUNS_PER_MODEL",
        "BITBENCH_TIMEOUT_SECS",
        "BITBENCH_STAGGER_MS",
        "OPENROUTER_BASE_URL",
    ];

    fn clear_env() {
        for v in VARS {
            std::env::remove_var(v);
        }
    }

    #[test]
    #[serial]
    fn defaults_match_benchmark_constants() {
        clear_env();
        let cfg = BenchConfig::from_env().unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("./results"));
        assert_eq!(cfg.run_settings(), RunSettings::default());
        assert_eq!(cfg.cache_dir(), PathBuf::from("./results/cache"));
        assert_eq!(cfg.cost_file(), PathBuf::from("./results/model-costs.json"));
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bitbench.yaml");
        std::fs::write(&path, "max_concurrency: 8\nruns_per_model: 3\n").unwrap();

        std::env::set_var("BITBENCH_MAX_CONCURRENCY", "2");
        std::env::set_var("BITBENCH_STAGGER_MS", " 75 ");
        let cfg = BenchConfig::load(Some(&path)).unwrap();
        clear_env();

        assert_eq!(cfg.max_concurrency, 2);
        assert_eq!(cfg.runs_per_model, 3);
        assert_eq!(cfg.stagger_delay_ms, 75);
    }

    #[test]
    #[serial]
    fn unparsable_env_value_is_config_error() {
        clear_env();
        std::env::set_var("BITBENCH_MAX_CONCURRENCY", "fourty");
        let err = BenchConfig::from_env().unwrap_err();
        clear_env();
        assert!(matches!(err, BenchError::Config { .. }));
        assert!(err.to_string().contains("BITBENCH_MAX_CONCURRENCY"));
        assert!(err.to_string().contains("fourty"));

        std::env::set_var("BITBENCH_TIMEOUT_SECS", "5m");
        let res = BenchConfig::load(None);
        clear_env();
        assert!(res.is_err());
    }

    #[test]
    #[serial]
    fn invalid_yaml_is_config_error() {
        clear_env();
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bitbench.yaml");
        std::fs::write(&path, "max_concurrency: [1, 2]\n").unwrap();
        assert!(matches!(
            BenchConfig::load(Some(&path)),
            Err(BenchError::Config { .. })
        ));
    }
}
