use gradebox::{ComparisonMode, EvaluationOptions, Language, TestCase, TestStatus};

use super::{assert_report_consistent, evaluate_fixture, fixture_source, test_evaluator};

#[tokio::test]
async fn test_hello_passes() {
    let cases = vec![TestCase::new("", "ok")];
    let report = evaluate_fixture("hello.py", Language::Python, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.passed, 1);
    assert_eq!(report.earned_points, 1);
    assert!(report.errors.is_empty());
    assert_eq!(report.test_results[0].output.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_reads_stdin() {
    let cases = vec![
        TestCase::new("2 3\n", "5").with_points(2),
        TestCase::new("10 -4\n", "6").with_points(3),
    ];
    let report = evaluate_fixture("sum.py", Language::Python, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.passed, 2);
    assert_eq!(report.earned_points, 5);
}

#[tokio::test]
async fn test_normalized_comparison() {
    let cases = vec![
        TestCase::new("", "a b").with_mode(ComparisonMode::Normalized),
        TestCase::new("", "a b"),
    ];
    let report = evaluate_fixture("spaces.py", Language::Python, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.test_results[0].status, TestStatus::Passed);
    assert_eq!(report.test_results[1].status, TestStatus::Failed);
    assert_eq!(report.test_results[1].actual.as_deref(), Some("a   b"));
}

#[tokio::test]
async fn test_uncaught_exception_is_runtime_error() {
    let cases = vec![TestCase::new("oops\n", "").with_description("raises")];
    let report = evaluate_fixture("crash.py", Language::Python, &cases).await;

    assert_report_consistent(&report, &cases);
    let result = &report.test_results[0];
    assert_eq!(result.status, TestStatus::RuntimeError);
    assert!(result.output.is_none());
    assert!(result.stderr.as_deref().unwrap().contains("ValueError"));
    assert!(result.error.as_deref().unwrap().contains("bad input: oops"));
    assert!(report.errors[0].starts_with("Case 1 (raises): "));
}

#[tokio::test]
async fn test_no_cases_runs_program_once() {
    let report = evaluate_fixture("hello.py", Language::Python, &[]).await;

    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total_points, 1);
    assert_eq!(report.test_results[0].description, "Program run");
}

#[tokio::test]
async fn test_no_cases_failing_program() {
    let report = evaluate_fixture("crash.py", Language::Python, &[]).await;

    assert_eq!(report.passed, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.earned_points, 0);
    assert_eq!(report.test_results[0].status, TestStatus::RuntimeError);
}

#[tokio::test]
async fn test_memory_limit_is_applied() {
    let evaluator = test_evaluator();
    let code = fixture_source("memory_hog.py");
    let cases = vec![TestCase::new("", "1073741824")];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(EvaluationOptions::default().with_memory_limit_mb(128));

    let report = evaluator.evaluate(&request).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.test_results[0].status, TestStatus::RuntimeError);
    assert!(report.test_results[0].error.as_deref().unwrap().contains("MemoryError"));
}

#[tokio::test]
async fn test_workspace_is_removed() {
    let scratch = tempfile::tempdir().unwrap();
    let mut config = gradebox::Config::default();
    config.scratch_dir = Some(scratch.path().to_path_buf());
    let evaluator = gradebox::Evaluator::new(config);
    let code = fixture_source("crash.py");
    let cases = vec![TestCase::new("x\n", "")];
    let request = evaluator.request(&code, Language::Python).with_test_cases(&cases);

    evaluator.evaluate(&request).await;

    assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
}
