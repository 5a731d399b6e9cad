use gradebox::{Language, Runner, TestCase, TestStatus, Workspace};

use super::{assert_report_consistent, evaluate_fixture, fixture_source};

#[tokio::test]
#[ignore = "requires a JDK"]
async fn test_public_class_compiles_and_runs() {
    let cases = vec![
        TestCase::new("Ada\n", "Hello, Ada!"),
        TestCase::new("", "Hello, world!").with_points(2),
    ];
    let report = evaluate_fixture("Foo.java", Language::Java, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.passed, 2, "errors: {:?}", report.errors);
    assert_eq!(report.earned_points, 3);
}

#[tokio::test]
#[ignore = "requires a JDK"]
async fn test_class_file_named_after_public_class() {
    let runner = Runner::with_defaults();
    let workspace = Workspace::create(None).unwrap();
    let program = runner
        .prepare(&workspace, Language::Java, &fixture_source("Foo.java"))
        .await
        .unwrap();

    assert_eq!(program.source_name, "Foo.java");
    runner.compile(&workspace, &program).await.unwrap();
    assert!(workspace.file_exists("Foo.class").await.unwrap());

    workspace.cleanup().unwrap();
}

#[tokio::test]
#[ignore = "requires a JDK"]
async fn test_compilation_failure_fails_every_case() {
    let cases = vec![
        TestCase::new("", "missing semicolon"),
        TestCase::new("", "missing semicolon").with_points(4),
    ];
    let report = evaluate_fixture("Broken.java", Language::Java, &cases).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Compilation failed: "));
    assert!(report.errors[0].chars().count() <= 500);
    assert_eq!(report.failed, 2);
    assert_eq!(report.total_points, 5);
    assert_eq!(report.earned_points, 0);
    assert!(
        report
            .test_results
            .iter()
            .all(|r| r.status == TestStatus::Error)
    );
}
