use serde::Serialize;

use super::{CacheKey, ResultCache};
use crate::fingerprint;
use crate::model::{ExecutionUnit, RunnableModel, TestSuite};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatus {
    pub cached_results: usize,
    pub total_expected: usize,
    /// Percentage of expected units with a valid cache entry.
    pub progress: f64,
    /// Some, but not all, units are cached.
    pub can_resume: bool,
}

/// Counts units of the selection that a run would satisfy from cache.
pub async fn cache_status(
    cache: &ResultCache,
    suite: &TestSuite,
    version: &str,
    models: &[RunnableModel],
    runs_per_model: u32,
) -> CacheStatus {
    let mut keyed = suite.clone();
    keyed.version = version.to_string();

    let total_expected = models.len() * suite.tests.len() * runs_per_model as usize;
    let mut cached_results = 0;

    for (model_index, model) in models.iter().enumerate() {
        for run_number in 1..=runs_per_model {
            for test_index in 0..suite.tests.len() {
                let unit = ExecutionUnit {
                    model: model.name.clone(),
                    model_index,
                    test_index,
                    run_number,
                };
                let fp = fingerprint::compute(&unit, &keyed);
                let key = CacheKey::new(&suite.id, version, &model.name, run_number, test_index);
                if cache.lookup(&key, &fp.hex).await.is_some() {
                    cached_results += 1;
                }
            }
        }
    }

    let progress = if total_expected == 0 {
        0.0
    } else {
        cached_results as f64 / total_expected as f64 * 100.0
    };

    CacheStatus {
        cached_results,
        total_expected,
        progress,
        can_resume: cached_results > 0 && cached_results < total_expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_result;
    use crate::model::TestCase;
    use tempfile::TempDir;

    fn suite() -> TestSuite {
        TestSuite {
            id: "suite".into(),
            name: "Suite".into(),
            description: String::new(),
            version: "v1".into(),
            chain: "bsv".into(),
            system_prompt: "sys".into(),
            tests: vec![
                TestCase {
                    prompt: "q0".into(),
                    answers: vec!["a".into()],
                    negative_answers: vec![],
                },
                TestCase {
                    prompt: "q1".into(),
                    answers: vec!["b".into()],
                    negative_answers: vec![],
                },
            ],
        }
    }

    #[tokio::test]
    async fn partial_cache_can_resume() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path());
        let s = suite();
        let models = vec![RunnableModel::new("m", "vendor/m")];

        let unit = ExecutionUnit {
            model: "m".into(),
            model_index: 0,
            test_index: 0,
            run_number: 1,
        };
        let fp = fingerprint::compute(&unit, &s);
        cache
            .store(&sample_result("m", 1, 0, &fp.hex))
            .await
            .unwrap();

        let status = cache_status(&cache, &s, "v1", &models, 1).await;
        assert_eq!(status.cached_results, 1);
        assert_eq!(status.total_expected, 2);
        assert!((status.progress - 50.0).abs() < f64::EPSILON);
        assert!(status.can_resume);
    }

    #[tokio::test]
    async fn empty_cache_cannot_resume() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path());
        let models = vec![RunnableModel::new("m", "vendor/m")];
        let status = cache_status(&cache, &suite(), "v1", &models, 2).await;
        assert_eq!(status.cached_results, 0);
        assert_eq!(status.total_expected, 4);
        assert!(!status.can_resume);
    }
}
