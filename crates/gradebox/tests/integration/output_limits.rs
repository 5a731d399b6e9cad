use std::time::{Duration, Instant};

use gradebox::runner::RunLimits;
use gradebox::{EvaluationOptions, ExecutionOutcome, Language, Runner, TestCase, TestStatus, Workspace};

use super::{assert_report_consistent, fixture_source, test_evaluator};

#[tokio::test]
async fn test_stdout_flood_is_killed_and_reported() {
    let evaluator = test_evaluator();
    let code = fixture_source("flood.py");
    let cases = vec![TestCase::new("", "x")];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(
            EvaluationOptions::default()
                .with_max_output_kb(16)
                .with_timeout_ms(10_000),
        );

    let start = Instant::now();
    let report = evaluator.evaluate(&request).await;

    assert_report_consistent(&report, &cases);
    assert_eq!(report.failed, 1);
    assert_eq!(report.test_results[0].status, TestStatus::RuntimeError);
    assert_eq!(
        report.test_results[0].error.as_deref(),
        Some("Output limit exceeded")
    );
    // killed early, well before the timeout
    assert!(start.elapsed() < Duration::from_secs(8));
}

#[tokio::test]
async fn test_stderr_flood_is_killed() {
    let evaluator = test_evaluator();
    let code = fixture_source("stderr_flood.py");
    let cases = vec![TestCase::new("", "")];
    let request = evaluator
        .request(&code, Language::Python)
        .with_test_cases(&cases)
        .with_options(EvaluationOptions::default().with_max_output_kb(16));

    let report = evaluator.evaluate(&request).await;

    assert_eq!(
        report.test_results[0].error.as_deref(),
        Some("Output limit exceeded")
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_flooding_process_is_gone_after_kill() {
    let runner = Runner::with_defaults();
    let workspace = Workspace::create(None).unwrap();
    let program = runner
        .prepare(&workspace, Language::Python, &fixture_source("flood.py"))
        .await
        .unwrap();

    let limits = RunLimits {
        timeout_ms: 10_000,
        memory_limit_mb: 256,
        max_output_bytes: 64 * 1024,
    };
    let outcome = runner.execute(&workspace, &program, "", limits).await.unwrap();

    assert_eq!(outcome.return_code, ExecutionOutcome::OUTPUT_LIMIT_RETURN_CODE);
    assert!(outcome.truncated);
    assert!(outcome.stdout.len() <= 64 * 1024);

    let pid: u32 = outcome
        .stdout
        .lines()
        .next()
        .and_then(|line| line.trim().parse().ok())
        .expect("flood.py prints its pid first");
    assert!(
        !std::path::Path::new(&format!("/proc/{pid}")).exists(),
        "process {pid} still running"
    );

    workspace.cleanup().unwrap();
}
