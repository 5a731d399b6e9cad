//! A library for grading untrusted code submissions.
//!
//! Gradebox runs student-submitted programs as supervised child processes,
//! feeds them each test case's input, and scores their output. It is an
//! execution and scoring engine, not a security boundary: there is no OS-level
//! isolation beyond best-effort resource limits, a wall-clock timeout and an
//! output ceiling.
//!
//! # Features
//!
//! - **Multi-language**: Python, JavaScript (Node.js) and Java, with toolchains set in TOML.
//! - **Output-bounded supervision**: concurrent stdout/stderr draining with early kill on floods.
//! - **Flexible comparison**: exact, whitespace-normalized, full-match regex and substring modes.
//! - **Weighted scoring**: per-case points and structured per-case results.
//! - **Quality gate**: static heuristics that warn about, or block, risky submissions.
//!
//! # Example
//!
//! ```no_run
//! use gradebox::{Evaluator, Language, TestCase};
//!
//! # async fn grade() {
//! let evaluator = Evaluator::with_defaults();
//! let cases = vec![TestCase::new("2 3\n", "5")];
//! let request = evaluator
//!     .request("a, b = map(int, input().split())\nprint(a + b)", Language::Python)
//!     .with_test_cases(&cases);
//!
//! let report = evaluator.evaluate(&request).await;
//! println!("{}/{} points", report.earned_points, report.total_points);
//! # }
//! ```

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Toolchain};
pub use feedback::{code_feedback, score_category};
pub use harness::{EvaluationRequest, Evaluator};
pub use runner::{CompileError, ExecuteError, PrepareError, Runner};
pub use sandbox::{SandboxError, Workspace};
pub use suite::{TestSuiteError, load_test_suite, parse_test_suite};
pub use types::{
    ComparisonMode, EvaluationOptions, EvaluationReport, ExecutionOutcome, Language,
    SecurityMode, TestCase, TestCaseResult, TestStatus, UnsupportedLanguage,
};

pub mod compare;
pub mod config;
pub mod feedback;
pub mod harness;
pub mod quality;
pub mod runner;
pub mod sandbox;
pub mod suite;
pub mod types;
