use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters kept in any free-text report field
pub const MAX_FIELD_CHARS: usize = 500;

/// Supported submission languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
}

impl Language {
    /// All supported languages, in display order
    pub const ALL: [Language; 3] = [Language::Python, Language::JavaScript, Language::Java];

    /// Identifier used for toolchain lookup and serialization
    pub fn id(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Language not supported: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(Language::Python),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "java" => Ok(Language::Java),
            _ => Err(UnsupportedLanguage(s.to_owned())),
        }
    }
}

/// How actual output is matched against the expected output of a test case
///
/// Unrecognized mode names are kept as [`ComparisonMode::Unknown`] so that a
/// bad test definition fails the case instead of the whole suite.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComparisonMode {
    #[default]
    Exact,
    Normalized,
    Regex,
    Contains,
    Unknown(String),
}

impl ComparisonMode {
    pub fn as_str(&self) -> &str {
        match self {
            ComparisonMode::Exact => "exact",
            ComparisonMode::Normalized => "normalized",
            ComparisonMode::Regex => "regex",
            ComparisonMode::Contains => "contains",
            ComparisonMode::Unknown(name) => name,
        }
    }
}

impl From<String> for ComparisonMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "exact" => ComparisonMode::Exact,
            "normalized" => ComparisonMode::Normalized,
            "regex" => ComparisonMode::Regex,
            "contains" => ComparisonMode::Contains,
            _ => ComparisonMode::Unknown(value),
        }
    }
}

impl From<ComparisonMode> for String {
    fn from(value: ComparisonMode) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the quality checker flags unsafe or dynamic code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    /// Report warnings and run the submission anyway
    #[default]
    Warn,
    /// Refuse to run the submission
    Block,
}

impl FromStr for SecurityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(SecurityMode::Warn),
            "block" => Ok(SecurityMode::Block),
            other => Err(format!("unknown security mode '{other}'")),
        }
    }
}

/// Submission-level evaluation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Default per-case wall-clock timeout in milliseconds
    pub timeout_ms: u64,

    /// Address-space limit in MiB (applied where the runtime supports it)
    pub memory_limit_mb: u64,

    /// Per-stream output ceiling in KiB
    pub max_output_kb: u64,

    /// Run the static quality heuristics before execution
    pub enable_quality_checks: bool,

    pub security_mode: SecurityMode,
}

impl EvaluationOptions {
    /// Lower bound accepted for any timeout, in milliseconds
    pub const MIN_TIMEOUT_MS: u64 = 50;
    /// Upper bound accepted for any timeout, in milliseconds
    pub const MAX_TIMEOUT_MS: u64 = 30_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default per-case timeout in milliseconds
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the memory limit in MiB
    pub fn with_memory_limit_mb(mut self, mb: u64) -> Self {
        self.memory_limit_mb = mb;
        self
    }

    /// Set the output ceiling in KiB
    pub fn with_max_output_kb(mut self, kb: u64) -> Self {
        self.max_output_kb = kb;
        self
    }

    pub fn with_quality_checks(mut self, enable: bool) -> Self {
        self.enable_quality_checks = enable;
        self
    }

    pub fn with_security_mode(mut self, mode: SecurityMode) -> Self {
        self.security_mode = mode;
        self
    }

    /// Output ceiling in bytes
    pub fn max_output_bytes(&self) -> usize {
        usize::try_from(self.max_output_kb.saturating_mul(1024)).unwrap_or(usize::MAX)
    }

    /// Timeout to use for a case, preferring a positive per-case override
    pub fn effective_timeout_ms(&self, case: &TestCase) -> u64 {
        match case.timeout_ms {
            Some(ms) if ms > 0 => ms,
            _ => self.timeout_ms,
        }
    }
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            memory_limit_mb: 256,
            max_output_kb: 64,
            enable_quality_checks: true,
            security_mode: SecurityMode::Warn,
        }
    }
}

/// One input/expected-output pair with its scoring weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,

    #[serde(default)]
    pub expected_output: String,

    /// Per-case timeout override in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub comparison_mode: ComparisonMode,

    #[serde(default = "default_points")]
    pub points: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_points() -> u32 {
    1
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            timeout_ms: None,
            comparison_mode: ComparisonMode::Exact,
            points: 1,
            description: None,
        }
    }

    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.comparison_mode = mode;
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description shown in reports; defaults to the case position
    pub fn description_or_default(&self, case_number: usize) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Test case {case_number}"))
    }
}

/// Raw result of one child process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
    /// Set when the process was killed for exceeding the output ceiling
    pub truncated: bool,
}

impl ExecutionOutcome {
    /// Return code reported for processes killed by the output ceiling
    pub const OUTPUT_LIMIT_RETURN_CODE: i32 = 137;

    pub fn is_success(&self) -> bool {
        self.return_code == 0
    }
}

/// Terminal state of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Timeout,
    RuntimeError,
    Error,
}

impl TestStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// 1-based position of the case in the submitted suite
    pub case_number: usize,
    pub description: String,
    pub points: u32,
    pub status: TestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl TestCaseResult {
    pub fn new(case_number: usize, description: String, points: u32, status: TestStatus) -> Self {
        Self {
            case_number,
            description,
            points,
            status,
            output: None,
            expected: None,
            actual: None,
            error: None,
            stderr: None,
        }
    }
}

/// The artifact handed to persistence and feedback generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub passed: usize,
    pub failed: usize,
    pub total_points: u32,
    pub earned_points: u32,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub test_results: Vec<TestCaseResult>,
}

impl EvaluationReport {
    pub const BLOCKED_MESSAGE: &'static str = "Blocked by security policy";

    /// Report for a submission rejected by the security gate
    pub fn blocked(warnings: Vec<String>) -> Self {
        Self {
            errors: vec![Self::BLOCKED_MESSAGE.to_owned()],
            warnings,
            ..Default::default()
        }
    }

    /// Append a case result and update counters
    pub fn record(&mut self, result: TestCaseResult) {
        self.total_points = self.total_points.saturating_add(result.points);
        if result.status.is_passed() {
            self.passed += 1;
            self.earned_points = self.earned_points.saturating_add(result.points);
        } else {
            self.failed += 1;
        }
        self.test_results.push(result);
    }

    /// Earned points as a whole percentage of the total (0 when nothing is scored)
    pub fn score_percent(&self) -> u32 {
        if self.total_points == 0 {
            return 0;
        }
        let percent = u64::from(self.earned_points) * 100 / u64::from(self.total_points);
        percent as u32
    }
}

/// Truncate text to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}
