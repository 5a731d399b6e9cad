use gradebox::{ComparisonMode, Language, TestCase, TestStatus};

use super::{assert_report_consistent, evaluate_fixture};

#[tokio::test]
#[ignore = "requires node"]
async fn test_reads_stdin_and_prints() {
    let cases = vec![
        TestCase::new("hello\n", "HELLO"),
        TestCase::new("mixed Case", "MIXED").with_mode(ComparisonMode::Contains),
    ];
    let report = evaluate_fixture("upper.js", Language::JavaScript, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.passed, 2, "errors: {:?}", report.errors);
}

#[tokio::test]
#[ignore = "requires node"]
async fn test_thrown_error_is_runtime_error() {
    let cases = vec![TestCase::new("", "")];
    let report = evaluate_fixture("throws.js", Language::JavaScript, &cases).await;

    assert_report_consistent(&report, &cases);
    let result = &report.test_results[0];
    assert_eq!(result.status, TestStatus::RuntimeError);
    assert!(result.stderr.as_deref().unwrap().contains("kaboom"));
}
