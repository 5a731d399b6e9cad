//! Test harness
//!
//! Evaluates one submission against its test suite: quality gate, workspace
//! setup, a single prepare/compile, one supervised run per case, and scoring.
//! Every path ends in a well-formed [`EvaluationReport`]; per-case failures
//! are recorded and never abort the remaining cases.

use tracing::{debug, info, instrument, warn};

use crate::compare;
use crate::config::Config;
use crate::quality;
use crate::runner::{ExecuteError, PreparedProgram, RunLimits, Runner};
use crate::sandbox::Workspace;
use crate::types::{
    EvaluationOptions, EvaluationReport, ExecutionOutcome, Language, MAX_FIELD_CHARS, SecurityMode,
    TestCase, TestCaseResult, TestStatus, truncate_chars,
};

/// Description of the single run made when a submission has no test cases
pub const PROGRAM_RUN_DESCRIPTION: &str = "Program run";

const RUNTIME_ERROR_MESSAGE: &str = "Runtime error";

/// One submission and the suite it is graded against
#[derive(Debug, Clone)]
pub struct EvaluationRequest<'a> {
    pub code: &'a str,
    pub language: Language,
    pub test_cases: &'a [TestCase],
    pub options: EvaluationOptions,
}

impl<'a> EvaluationRequest<'a> {
    /// Create a request with default options and no test cases
    pub fn new(code: &'a str, language: Language) -> Self {
        Self {
            code,
            language,
            test_cases: &[],
            options: EvaluationOptions::default(),
        }
    }

    pub fn with_test_cases(mut self, test_cases: &'a [TestCase]) -> Self {
        self.test_cases = test_cases;
        self
    }

    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Grades submissions using the toolchains from a [`Config`]
#[derive(Debug, Clone)]
pub struct Evaluator {
    runner: Runner,
}

impl Evaluator {
    pub fn new(config: Config) -> Self {
        Self {
            runner: Runner::new(config),
        }
    }

    /// Create an evaluator with the embedded default configuration
    pub fn with_defaults() -> Self {
        Self {
            runner: Runner::with_defaults(),
        }
    }

    pub fn config(&self) -> &Config {
        self.runner.config()
    }

    /// Start a request using the configured default options
    pub fn request<'a>(&self, code: &'a str, language: Language) -> EvaluationRequest<'a> {
        EvaluationRequest::new(code, language).with_options(self.config().defaults.clone())
    }

    /// Evaluate a submission and produce its report
    #[instrument(skip_all, fields(language = %request.language, cases = request.test_cases.len()))]
    pub async fn evaluate(&self, request: &EvaluationRequest<'_>) -> EvaluationReport {
        let options = &request.options;

        let warnings = if options.enable_quality_checks {
            quality::check(request.code, request.language)
        } else {
            Vec::new()
        };

        if options.security_mode == SecurityMode::Block && quality::is_blocking(&warnings) {
            warn!(?warnings, "submission blocked by security policy");
            return EvaluationReport::blocked(warnings);
        }

        let mut report = EvaluationReport {
            warnings,
            ..Default::default()
        };

        let workspace = match Workspace::create(self.config().scratch_dir.as_deref()) {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!(error = %e, "could not create workspace");
                fail_all(&mut report, request.test_cases, &e.to_string());
                return report;
            }
        };

        self.run_suite(&workspace, request, &mut report).await;

        if let Err(e) = workspace.cleanup() {
            warn!(error = %e, "workspace cleanup failed");
        }

        info!(
            passed = report.passed,
            failed = report.failed,
            earned_points = report.earned_points,
            total_points = report.total_points,
            "evaluation complete"
        );

        report
    }

    async fn run_suite(
        &self,
        workspace: &Workspace,
        request: &EvaluationRequest<'_>,
        report: &mut EvaluationReport,
    ) {
        let program = match self
            .runner
            .prepare(workspace, request.language, request.code)
            .await
        {
            Ok(program) => program,
            Err(e) => {
                warn!(error = %e, "could not prepare submission");
                fail_all(report, request.test_cases, &e.to_string());
                return;
            }
        };

        match self.runner.compile(workspace, &program).await {
            Ok(Some(compiled)) if !compiled.output.is_empty() => {
                debug!(diagnostics = %compiled.output, "compiled with diagnostics");
            }
            Ok(_) => {}
            Err(e) => {
                let message = if e.is_rejection() {
                    format!("Compilation failed: {e}")
                } else {
                    e.to_string()
                };
                info!(%message, "compilation did not succeed");
                fail_all(report, request.test_cases, &message);
                return;
            }
        }

        let options = &request.options;

        if request.test_cases.is_empty() {
            let limits = run_limits(options, options.timeout_ms);
            let outcome = self.runner.execute(workspace, &program, "", limits).await;
            let scored = score(1, PROGRAM_RUN_DESCRIPTION.to_owned(), 1, None, outcome);
            record(report, scored);
            return;
        }

        for (index, case) in request.test_cases.iter().enumerate() {
            let case_number = index + 1;
            let scored = self
                .run_case(workspace, &program, case_number, case, options)
                .await;
            record(report, scored);
        }
    }

    async fn run_case(
        &self,
        workspace: &Workspace,
        program: &PreparedProgram,
        case_number: usize,
        case: &TestCase,
        options: &EvaluationOptions,
    ) -> Scored {
        let timeout_ms = options.effective_timeout_ms(case);
        let limits = run_limits(options, timeout_ms);
        let outcome = self
            .runner
            .execute(workspace, program, &case.input, limits)
            .await;

        score(
            case_number,
            case.description_or_default(case_number),
            case.points,
            Some(case),
            outcome,
        )
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// A scored case and the message to surface in the report's errors
struct Scored {
    result: TestCaseResult,
    message: Option<String>,
}

fn run_limits(options: &EvaluationOptions, timeout_ms: u64) -> RunLimits {
    RunLimits {
        timeout_ms,
        memory_limit_mb: options.memory_limit_mb,
        max_output_bytes: options.max_output_bytes(),
    }
}

/// Classify one run
///
/// Without a test case the run passes iff the program exits with status 0.
fn score(
    case_number: usize,
    description: String,
    points: u32,
    case: Option<&TestCase>,
    outcome: Result<ExecutionOutcome, ExecuteError>,
) -> Scored {
    let mut result = TestCaseResult::new(case_number, description, points, TestStatus::Error);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e @ ExecuteError::Timeout(_)) => {
            let message = e.to_string();
            result.status = TestStatus::Timeout;
            result.error = Some(message.clone());
            return Scored {
                result,
                message: Some(message),
            };
        }
        Err(e) => {
            let message = truncate_chars(&e.to_string(), MAX_FIELD_CHARS);
            result.error = Some(message.clone());
            return Scored {
                result,
                message: Some(message),
            };
        }
    };

    if !outcome.is_success() {
        let raw = if outcome.stderr.is_empty() {
            &outcome.stdout
        } else {
            &outcome.stderr
        };
        let message = match raw.trim() {
            "" => RUNTIME_ERROR_MESSAGE.to_owned(),
            msg => truncate_chars(msg, MAX_FIELD_CHARS),
        };
        result.status = TestStatus::RuntimeError;
        result.error = Some(message.clone());
        result.stderr =
            (!outcome.stderr.is_empty()).then(|| truncate_chars(&outcome.stderr, MAX_FIELD_CHARS));
        return Scored {
            result,
            message: Some(message),
        };
    }

    let actual = outcome.stdout.trim();
    let Some(case) = case else {
        result.status = TestStatus::Passed;
        result.output = Some(truncate_chars(actual, MAX_FIELD_CHARS));
        return Scored {
            result,
            message: None,
        };
    };

    let (matches, message) = compare::compare(actual, &case.expected_output, &case.comparison_mode);
    if matches {
        result.status = TestStatus::Passed;
        result.output = Some(truncate_chars(actual, MAX_FIELD_CHARS));
        return Scored {
            result,
            message: None,
        };
    }

    let message = truncate_chars(&message.unwrap_or_default(), MAX_FIELD_CHARS);
    result.status = TestStatus::Failed;
    result.error = Some(message.clone());
    result.expected = Some(truncate_chars(&case.expected_output, MAX_FIELD_CHARS));
    result.actual = Some(truncate_chars(actual, MAX_FIELD_CHARS));
    Scored {
        result,
        message: Some(message),
    }
}

fn record(report: &mut EvaluationReport, scored: Scored) {
    let Scored { result, message } = scored;

    debug!(
        case_number = result.case_number,
        status = ?result.status,
        "case scored"
    );

    if let Some(message) = message {
        report.errors.push(truncate_chars(
            &format!("Case {} ({}): {message}", result.case_number, result.description),
            MAX_FIELD_CHARS,
        ));
    }
    report.record(result);
}

/// Record every case as an error caused by one submission-wide failure
fn fail_all(report: &mut EvaluationReport, cases: &[TestCase], message: &str) {
    let message = truncate_chars(message, MAX_FIELD_CHARS);
    report.errors.push(message.clone());

    let failed_case = |case_number: usize, description: String, points: u32| {
        let mut result = TestCaseResult::new(case_number, description, points, TestStatus::Error);
        result.error = Some(message.clone());
        result
    };

    if cases.is_empty() {
        report.record(failed_case(1, PROGRAM_RUN_DESCRIPTION.to_owned(), 1));
        return;
    }

    for (index, case) in cases.iter().enumerate() {
        let case_number = index + 1;
        report.record(failed_case(
            case_number,
            case.description_or_default(case_number),
            case.points,
        ));
    }
}
