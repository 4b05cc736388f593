//! End-to-end contract for the `bitbench` binary: exit codes, files written,
//! and cache reuse across invocations. Uses the offline fake provider.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const SUITE: &str = r#"{
  "name": "BSV Basics",
  "chain": "bsv",
  "systemPrompt": "Answer with one word.",
  "tests": [
    { "prompt": "question zero", "answers": ["answer0"] },
    { "prompt": "question one", "answers": ["answer1"] }
  ]
}"#;

const MODELS: &str = "kimi-k2,gpt-oss-20b";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("suites")).unwrap();
        fs::write(dir.path().join("suites/bsv-basics.json"), SUITE).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn out(&self) -> PathBuf {
        self.path().join("out")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("bitbench").unwrap();
        cmd.current_dir(self.path())
            .env_remove("BITBENCH_OUTPUT_DIR")
            .env_remove("BITBENCH_MAX_CONCURRENCY")
            .env_remove("BITBENCH_RUNS_PER_MODEL")
            .env_remove("BITBENCH_TIMEOUT_SECS")
            .env_remove("BITBENCH_STAGGER_MS")
            .env_remove("OPENROUTER_BASE_URL")
            .env_remove("OPENROUTER_API_KEY")
            .env("RUST_LOG", "warn");
        cmd
    }

    fn fake_run(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.args([
            "run",
            "--suite",
            "suites/bsv-basics.json",
            "--models",
            MODELS,
            "--version",
            "v1",
            "--stagger",
            "0ms",
            "--output",
            "out",
            "--provider",
            "fake",
            "--fake-response",
            "The answer is answer0",
        ]);
        cmd
    }
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    serde_json::from_str(&content).expect("invalid JSON")
}

#[test]
fn fake_run_writes_report_and_latest() {
    let ws = Workspace::new();
    ws.fake_run()
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Plan: 4 units, 4 to execute, 0 from cache"))
        .stderr(predicate::str::contains("Report written to"));

    let reports: Vec<_> = fs::read_dir(ws.out().join("bsv-basics/v1"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let file = read_json(&reports[0]);
    assert_eq!(file["suite_id"], "bsv-basics");
    assert_eq!(file["results"].as_array().unwrap().len(), 4);

    let latest = read_json(&ws.out().join("latest-report.json"));
    let rankings = latest["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 2);
    for r in rankings {
        assert_eq!(r["correct"], 1);
        assert_eq!(r["incorrect"], 1);
        assert_eq!(r["errors"], 0);
    }
    assert_eq!(latest["cancelled"], false);
}

#[test]
fn second_run_is_served_from_cache() {
    let ws = Workspace::new();
    ws.fake_run().assert().code(0);
    ws.fake_run()
        .assert()
        .code(0)
        .stderr(predicate::str::contains("0 to execute, 4 from cache"));
}

#[test]
fn no_publish_skips_latest_report() {
    let ws = Workspace::new();
    ws.fake_run().arg("--no-publish").assert().code(0);
    assert!(!ws.out().join("latest-report.json").exists());
    assert!(ws.out().join("bsv-basics/v1").is_dir());
}

#[test]
fn status_reflects_cache_progress() {
    let ws = Workspace::new();
    let status = |ws: &Workspace| {
        let mut cmd = ws.cmd();
        cmd.args([
            "status",
            "--suite",
            "suites/bsv-basics.json",
            "--models",
            MODELS,
            "--version",
            "v1",
            "--output",
            "out",
        ]);
        cmd
    };

    status(&ws)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Cached:    0/4 (0%)"))
        .stdout(predicate::str::contains("Remaining: 4 units, est. $0.0400"));

    ws.fake_run().assert().code(0);

    let out = status(&ws).arg("--json").output().unwrap();
    assert!(out.status.success());
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["cached_results"], 4);
    assert_eq!(v["total_expected"], 4);
    assert_eq!(v["remaining_units"], 0);
    assert_eq!(v["can_resume"], false);
}

#[test]
fn configuration_errors_exit_2() {
    let ws = Workspace::new();

    ws.cmd()
        .args([
            "run", "--suite", "suites/bsv-basics.json", "--models", "nope", "--provider", "fake",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown model(s): nope"));

    ws.cmd()
        .args(["run", "--suite", "suites/missing.json", "--provider", "fake"])
        .assert()
        .code(2);

    ws.fake_run()
        .args(["--runs", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("runs_per_model"));

    ws.fake_run()
        .env("BITBENCH_MAX_CONCURRENCY", "fourty")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("BITBENCH_MAX_CONCURRENCY"));
}

#[test]
fn live_provider_requires_api_key() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "run", "--suite", "suites/bsv-basics.json", "--models", "kimi-k2", "--output", "out",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OPENROUTER_API_KEY"));
}

#[test]
fn unreachable_backend_finishes_with_errors() {
    let ws = Workspace::new();
    ws.cmd()
        .env("OPENROUTER_API_KEY", "test-key")
        .env("OPENROUTER_BASE_URL", "http://127.0.0.1:9")
        .args([
            "run",
            "--suite",
            "suites/bsv-basics.json",
            "--models",
            "kimi-k2",
            "--version",
            "v1",
            "--timeout",
            "5s",
            "--stagger",
            "0ms",
            "--output",
            "out",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("2 units failed"));

    let latest = read_json(&ws.out().join("latest-report.json"));
    assert_eq!(latest["rankings"][0]["errors"], 2);
    assert_eq!(latest["rankings"][0]["success_rate"], 0.0);
}

#[test]
fn estimate_uses_cost_table_after_update() {
    let ws = Workspace::new();
    let estimate = |ws: &Workspace| {
        let mut cmd = ws.cmd();
        cmd.args([
            "estimate",
            "--suite",
            "suites/bsv-basics.json",
            "--models",
            "kimi-k2",
            "--runs",
            "2",
            "--output",
            "out",
        ]);
        cmd
    };

    estimate(&ws)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("4 units, estimated $0.0400"));

    ws.fake_run().assert().code(0);
    ws.cmd()
        .args(["costs", "update", "--output", "out"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Updated 2 models"));

    let table = read_json(&ws.out().join("model-costs.json"));
    assert_eq!(table["costs"]["kimi-k2"], 0.001);
    assert_eq!(table["_meta"]["sampleCount"]["kimi-k2"], 2);

    estimate(&ws)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("4 units, estimated $0.0040"));
}

#[test]
fn breakdown_lists_hardest_question_first() {
    let ws = Workspace::new();
    ws.fake_run().assert().code(0);

    let out = ws
        .cmd()
        .args(["breakdown", "--suite-id", "bsv-basics", "--output", "out", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["version"], "v1");
    assert_eq!(v["total_questions"], 2);
    assert_eq!(v["total_models"], 2);
    assert_eq!(v["questions"][0]["test_index"], 1);
    assert_eq!(v["questions"][0]["correct_count"], 0);

    ws.cmd()
        .args(["breakdown", "--suite-id", "bsv-basics", "--output", "out"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("missed by: gpt-oss-20b, kimi-k2"));

    ws.cmd()
        .args(["breakdown", "--suite-id", "unknown", "--output", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no cached results"));
}

#[test]
fn suites_and_models_list() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["suites", "--dir", "suites", "--models", MODELS, "--version", "v1", "--output", "out"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("bsv-basics"))
        .stdout(predicate::str::contains("BSV Basics"));

    ws.cmd()
        .arg("models")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("moonshotai/kimi-k2"))
        .stdout(predicate::str::contains("models"));
}
