//! Test suite loading
//!
//! Suites are JSON arrays of test case objects. Fields other than
//! `expected_output` are optional; see [`TestCase`] for the defaults.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::types::{EvaluationOptions, TestCase};

#[derive(Debug, Error)]
pub enum TestSuiteError {
    #[error("failed to read test suite: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse test suite: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("test case {case_number}: timeout_ms {timeout_ms} is outside {min}..={max}")]
    TimeoutOutOfRange {
        case_number: usize,
        timeout_ms: u64,
        min: u64,
        max: u64,
    },
}

/// Load and validate a suite from a JSON file
pub fn load_test_suite(path: impl AsRef<Path>) -> Result<Vec<TestCase>, TestSuiteError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let cases = parse_test_suite(&content)?;
    debug!(?path, cases = cases.len(), "loaded test suite");
    Ok(cases)
}

/// Parse and validate a suite from JSON text
pub fn parse_test_suite(json: &str) -> Result<Vec<TestCase>, TestSuiteError> {
    let cases: Vec<TestCase> = serde_json::from_str(json)?;
    validate(&cases)?;
    Ok(cases)
}

fn validate(cases: &[TestCase]) -> Result<(), TestSuiteError> {
    let range = EvaluationOptions::MIN_TIMEOUT_MS..=EvaluationOptions::MAX_TIMEOUT_MS;
    for (index, case) in cases.iter().enumerate() {
        if let Some(timeout_ms) = case.timeout_ms
            && !range.contains(&timeout_ms)
        {
            return Err(TestSuiteError::TimeoutOutOfRange {
                case_number: index + 1,
                timeout_ms,
                min: *range.start(),
                max: *range.end(),
            });
        }
    }
    Ok(())
}
