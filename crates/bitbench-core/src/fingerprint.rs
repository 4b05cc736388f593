use crate::model::{ExecutionUnit, TestSuite, CACHE_VERSION};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub hex: String,
    pub components: Vec<String>,
}

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Computes a deterministic fingerprint for one execution unit.
///
/// Only content that changes the expected answer distribution participates:
/// suite identity and version, model, run/test position, the prompts, the
/// required answers and the cache layout version. Answers are treated as a set
/// (sorted, deduplicated). The inputs form one JSON object encoded with JCS, so
/// text inside a prompt cannot be mistaken for a field boundary.
///
/// `components` is a readable rendering for debug logs; it is not hashed.
pub fn compute(unit: &ExecutionUnit, suite: &TestSuite) -> Fingerprint {
    let (prompt, answers) = match suite.tests.get(unit.test_index) {
        Some(tc) => (tc.prompt.as_str(), answer_set(&tc.answers)),
        None => ("", Vec::new()),
    };

    let canonical = json!({
        "cache_version": CACHE_VERSION,
        "suite": suite.id,
        "version": suite.version,
        "model": unit.model,
        "run": unit.run_number,
        "test_index": unit.test_index,
        "system_prompt": suite.system_prompt,
        "prompt": prompt,
        "answers": answers,
    });
    // A Value of strings and integers always serializes.
    let encoded = serde_jcs::to_string(&canonical).unwrap_or_else(|_| canonical.to_string());

    let components = match &canonical {
        Value::Object(map) => map.iter().map(|(k, v)| format!("{}={}", k, v)).collect(),
        _ => Vec::new(),
    };

    Fingerprint {
        hex: sha256_hex(&encoded),
        components,
    }
}

fn answer_set(answers: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = answers.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
