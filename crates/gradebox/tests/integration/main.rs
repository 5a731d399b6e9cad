//! Integration tests for gradebox
//!
//! These tests run real submissions and need `python3` on the PATH.
//! Run with: cargo test -p gradebox --features integration-tests
//!
//! Tests that need a JDK or Node.js are marked `#[ignore]`. To include them:
//!    cargo test -p gradebox --features integration-tests -- --include-ignored

#![cfg(feature = "integration-tests")]

use std::fs;

use gradebox::{Config, EvaluationReport, Evaluator, Language, TestCase};

mod config_loading;
mod java_execution;
mod javascript_execution;
mod output_limits;
mod python_execution;
mod security;
mod test_suites;
mod timeouts;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Evaluator with the embedded default toolchains
pub(crate) fn test_evaluator() -> Evaluator {
    Evaluator::new(Config::default())
}

/// Evaluate a fixture with the default options
pub(crate) async fn evaluate_fixture(
    name: &str,
    language: Language,
    cases: &[TestCase],
) -> EvaluationReport {
    let evaluator = test_evaluator();
    let code = fixture_source(name);
    let request = evaluator.request(&code, language).with_test_cases(cases);
    evaluator.evaluate(&request).await
}

/// Check the invariants every report must satisfy
pub(crate) fn assert_report_consistent(report: &EvaluationReport, cases: &[TestCase]) {
    assert_eq!(report.passed + report.failed, report.test_results.len());
    assert!(report.earned_points <= report.total_points);
    if !cases.is_empty() {
        assert_eq!(report.test_results.len(), cases.len());
        assert_eq!(
            report.total_points,
            cases.iter().map(|c| c.points).sum::<u32>()
        );
    }
    for (index, result) in report.test_results.iter().enumerate() {
        assert_eq!(result.case_number, index + 1);
    }
}
