use std::time::{Duration, Instant};

use gradebox::{EvaluationOptions, Language, TestCase, TestStatus};

use super::{assert_report_consistent, fixture_source, test_evaluator};

#[tokio::test]
async fn test_sleep_beyond_timeout() {
    let evaluator = test_evaluator();
    let code = fixture_source("sleepy.py");
    let cases = vec![TestCase::new("", "woke up")];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(EvaluationOptions::default().with_timeout_ms(500));

    let start = Instant::now();
    let report = evaluator.evaluate(&request).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.test_results[0].status, TestStatus::Timeout);
    assert_eq!(
        report.test_results[0].error.as_deref(),
        Some("Timeout after 500ms")
    );
    assert_eq!(report.errors, vec!["Case 1 (Test case 1): Timeout after 500ms"]);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_per_case_timeout_override() {
    let evaluator = test_evaluator();
    let code = fixture_source("sleepy.py");
    let cases = vec![
        TestCase::new("", "woke up").with_timeout_ms(300),
        TestCase::new("", "woke up").with_timeout_ms(400).with_points(2),
    ];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases);

    let report = evaluator.evaluate(&request).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(
        report.test_results[0].error.as_deref(),
        Some("Timeout after 300ms")
    );
    assert_eq!(
        report.test_results[1].error.as_deref(),
        Some("Timeout after 400ms")
    );
    assert_eq!(report.failed, 2);
    assert_eq!(report.total_points, 3);
}
