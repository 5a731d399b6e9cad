//! Plain-text summary of an evaluation report
//!
//! Renders the code evaluation section that feedback generators embed in
//! their output, plus the score bands used alongside it.

use crate::types::{EvaluationReport, truncate_chars};

const HEADER: &str = "=== CODE EVALUATION ===";
const MAX_WARNINGS: usize = 5;
const MAX_ERRORS: usize = 3;
const MAX_ERROR_CHARS: usize = 300;

/// Performance band for a 0-100 score
pub fn score_category(score: u32) -> &'static str {
    match score {
        90.. => "Excellent",
        75..=89 => "Good",
        60..=74 => "Satisfactory",
        40..=59 => "Needs Improvement",
        _ => "Unsatisfactory",
    }
}

/// Render the code evaluation section for a report
///
/// The test summary is omitted when no case ran; warnings and errors are
/// listed only when present.
pub fn code_feedback(report: &EvaluationReport) -> String {
    let mut sections = Vec::new();

    let total_tests = report.passed + report.failed;
    if total_tests > 0 {
        sections.push(HEADER.to_owned());

        if report.total_points > 0 {
            sections.push(format!(
                "Test Results: {}/{total_tests} tests passed ({}/{} points)",
                report.passed, report.earned_points, report.total_points
            ));
        } else {
            sections.push(format!(
                "Test Results: {} passed, {} failed",
                report.passed, report.failed
            ));
        }

        let success_rate = report.passed as f64 / total_tests as f64 * 100.0;
        sections.push(format!("Success Rate: {success_rate:.1}%"));
    }

    if !report.warnings.is_empty() {
        sections.push("\nCode Quality Warnings:".to_owned());
        for (i, warning) in report.warnings.iter().take(MAX_WARNINGS).enumerate() {
            sections.push(format!("  {}. {warning}", i + 1));
        }
        if report.warnings.len() > MAX_WARNINGS {
            sections.push(format!(
                "  ... and {} more warnings",
                report.warnings.len() - MAX_WARNINGS
            ));
        }
    }

    if !report.errors.is_empty() {
        sections.push("\nErrors Encountered:".to_owned());
        for (i, error) in report.errors.iter().take(MAX_ERRORS).enumerate() {
            sections.push(format!(
                "  {}. {}",
                i + 1,
                truncate_chars(error, MAX_ERROR_CHARS)
            ));
        }
        if report.errors.len() > MAX_ERRORS {
            sections.push(format!(
                "  ... and {} more errors",
                report.errors.len() - MAX_ERRORS
            ));
        }
    }

    sections.join("\n")
}
