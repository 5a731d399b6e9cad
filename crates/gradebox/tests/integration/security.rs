use gradebox::{EvaluationOptions, EvaluationReport, Language, SecurityMode, TestCase, TestStatus};

use super::{fixture_source, test_evaluator};

#[tokio::test]
async fn test_block_mode_rejects_unsafe_import() {
    let evaluator = test_evaluator();
    let code = fixture_source("unsafe.py");
    let cases = vec![TestCase::new("", "ok").with_points(4)];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(EvaluationOptions::default().with_security_mode(SecurityMode::Block));

    let report = evaluator.evaluate(&request).await;

    assert_eq!(report.errors, vec![EvaluationReport::BLOCKED_MESSAGE]);
    assert_eq!(
        report.warnings,
        vec!["Warning: Potentially unsafe imports detected"]
    );
    assert_eq!(report.passed, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total_points, 0);
    assert_eq!(report.earned_points, 0);
    assert!(report.test_results.is_empty());
}

#[tokio::test]
async fn test_warn_mode_runs_and_keeps_warnings() {
    let evaluator = test_evaluator();
    let code = fixture_source("unsafe.py");
    let cases = vec![TestCase::new("", "ok")];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(EvaluationOptions::default().with_security_mode(SecurityMode::Warn));

    let report = evaluator.evaluate(&request).await;

    assert_eq!(report.test_results[0].status, TestStatus::Passed);
    assert_eq!(
        report.warnings,
        vec!["Warning: Potentially unsafe imports detected"]
    );
}

#[tokio::test]
async fn test_block_mode_allows_clean_code() {
    let evaluator = test_evaluator();
    let code = fixture_source("hello.py");
    let cases = vec![TestCase::new("", "ok")];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(EvaluationOptions::default().with_security_mode(SecurityMode::Block));

    let report = evaluator.evaluate(&request).await;

    assert_eq!(report.passed, 1);
    assert!(report.warnings.is_empty());
}
