use gradebox::{Language, TestStatus, TestSuiteError, load_test_suite};

use super::{FIXTURES_PATH, assert_report_consistent, evaluate_fixture};

#[tokio::test]
async fn test_suite_file_scores_weighted_points() {
    let cases = load_test_suite(format!("{FIXTURES_PATH}/suites/sum.json")).unwrap();
    let report = evaluate_fixture("sum.py", Language::Python, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.passed, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total_points, 7);
    assert_eq!(report.earned_points, 6);
    assert_eq!(report.test_results[3].status, TestStatus::Failed);
    assert_eq!(
        report.errors,
        vec![r#"Case 4 (wrong on purpose): Expected "9", got "8""#]
    );
    assert_eq!(report.score_percent(), 85);
}

#[test]
fn test_suite_with_invalid_timeout_is_rejected() {
    let result = load_test_suite(format!("{FIXTURES_PATH}/suites/invalid_timeout.json"));
    assert!(matches!(
        result,
        Err(TestSuiteError::TimeoutOutOfRange { case_number: 1, .. })
    ));
}
