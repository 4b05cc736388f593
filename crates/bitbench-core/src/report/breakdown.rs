//! Per-question view over cached results.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::cache::ResultCache;
use crate::model::CachedResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionModelResult {
    pub model: String,
    pub correct: bool,
    pub response: String,
    pub duration_ms: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionBreakdown {
    pub test_index: usize,
    pub prompt: String,
    pub answers: Vec<String>,
    pub total_models: usize,
    pub correct_count: usize,
    pub success_rate: f64,
    /// Incorrect first, then by model name.
    pub model_results: Vec<QuestionModelResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteQuestionBreakdown {
    pub suite_id: String,
    pub version: String,
    pub total_questions: usize,
    pub total_models: usize,
    /// Hardest questions first.
    pub questions: Vec<QuestionBreakdown>,
}

/// Groups a suite version's cached results by question.
///
/// Without `version`, the lexically greatest version directory is used.
/// Returns `None` when there is nothing cached.
pub async fn question_breakdown(
    cache: &ResultCache,
    suite_id: &str,
    version: Option<&str>,
) -> Option<SuiteQuestionBreakdown> {
    let version = match version {
        Some(v) => v.to_string(),
        None => cache.versions(suite_id).await.pop()?,
    };
    let results = cache.list_version(suite_id, &version).await;
    if results.is_empty() {
        return None;
    }
    Some(build_breakdown(suite_id, &version, &results))
}

pub fn build_breakdown(suite_id: &str, version: &str, results: &[CachedResult]) -> SuiteQuestionBreakdown {
    let total_models = results
        .iter()
        .map(|r| r.model.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut by_question: BTreeMap<usize, Vec<&CachedResult>> = BTreeMap::new();
    for r in results {
        by_question.entry(r.test_index).or_default().push(r);
    }

    let mut questions: Vec<QuestionBreakdown> = by_question
        .into_iter()
        .map(|(test_index, rs)| {
            // One result per model: the lowest run number.
            let mut per_model: BTreeMap<&str, &CachedResult> = BTreeMap::new();
            for &r in &rs {
                per_model
                    .entry(r.model.as_str())
                    .and_modify(|cur| {
                        if r.run_number < cur.run_number {
                            *cur = r;
                        }
                    })
                    .or_insert(r);
            }

            let mut model_results: Vec<QuestionModelResult> = per_model
                .values()
                .map(|r| QuestionModelResult {
                    model: r.model.clone(),
                    correct: r.result.correct,
                    response: r.result.text.clone(),
                    duration_ms: r.duration_ms,
                    cost: r.cost_usd,
                })
                .collect();
            model_results.sort_by(|a, b| a.correct.cmp(&b.correct).then_with(|| a.model.cmp(&b.model)));

            let correct_count = model_results.iter().filter(|m| m.correct).count();
            let n = model_results.len();
            QuestionBreakdown {
                test_index,
                prompt: rs[0].prompt.clone(),
                answers: rs[0].answers.clone(),
                total_models: n,
                correct_count,
                success_rate: if n > 0 {
                    correct_count as f64 / n as f64 * 100.0
                } else {
                    0.0
                },
                model_results,
            }
        })
        .collect();

    questions.sort_by(|a, b| {
        a.success_rate
            .partial_cmp(&b.success_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    SuiteQuestionBreakdown {
        suite_id: suite_id.to_string(),
        version: version.to_string(),
        total_questions: questions.len(),
        total_models,
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::sample_result;
    use tempfile::TempDir;

    fn result(model: &str, run: u32, test: usize, correct: bool) -> CachedResult {
        let mut r = sample_result(model, run, test, "sig");
        r.result.correct = correct;
        r
    }

    #[test]
    fn hardest_question_first_and_first_run_wins() {
        let results = vec![
            result("a", 1, 0, true),
            result("b", 1, 0, true),
            result("a", 1, 1, false),
            result("a", 2, 1, true),
            result("b", 1, 1, true),
        ];
        let bd = build_breakdown("suite", "v1", &results);
        assert_eq!(bd.total_models, 2);
        assert_eq!(bd.total_questions, 2);

        let q1 = &bd.questions[0];
        assert_eq!(q1.test_index, 1);
        assert_eq!(q1.correct_count, 1);
        assert!((q1.success_rate - 50.0).abs() < 1e-9);
        assert_eq!(q1.model_results[0].model, "a");
        assert!(!q1.model_results[0].correct);

        assert_eq!(bd.questions[1].correct_count, 2);
    }

    #[tokio::test]
    async fn picks_latest_version_when_unspecified() {
        let tmp = TempDir::new().unwrap();
        let cache = ResultCache::new(tmp.path());
        let mut old = result("a", 1, 0, false);
        old.version = "2026-01-01".into();
        let mut new = result("a", 1, 0, true);
        new.version = "2026-02-01".into();
        cache.store(&old).await.unwrap();
        cache.store(&new).await.unwrap();

        let bd = question_breakdown(&cache, "suite", None).await.unwrap();
        assert_eq!(bd.version, "2026-02-01");
        assert_eq!(bd.questions[0].correct_count, 1);

        assert!(question_breakdown(&cache, "other", None).await.is_none());
    }
}
