//! Static quality heuristics
//!
//! Advisory checks run over the submitted source text before anything is
//! executed. The checks never fail; they only produce warnings.

use crate::types::Language;

/// Source length (in characters) above which a submission is flagged
const MAX_SOURCE_CHARS: usize = 50_000;

/// Line count above which a submission is flagged
const MAX_SOURCE_LINES: usize = 1000;

const UNSAFE_IMPORTS: [&str; 2] = ["import os", "import subprocess"];
const DYNAMIC_EXECUTION: [&str; 2] = ["eval(", "exec("];

/// Keywords that make a warning blocking under `SecurityMode::Block`
const BLOCKING_KEYWORDS: [&str; 2] = ["unsafe", "dynamic"];

/// Scan source text and return advisory warnings
pub fn check(code: &str, language: Language) -> Vec<String> {
    match language {
        Language::Python => check_python(code),
        Language::JavaScript | Language::Java => Vec::new(),
    }
}

fn check_python(code: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    if code.chars().count() > MAX_SOURCE_CHARS {
        warnings.push("Code is very long (>50K chars)".to_owned());
    }
    if UNSAFE_IMPORTS.iter().any(|needle| code.contains(needle)) {
        warnings.push("Warning: Potentially unsafe imports detected".to_owned());
    }
    if DYNAMIC_EXECUTION.iter().any(|needle| code.contains(needle)) {
        warnings.push("Warning: Dynamic code execution detected".to_owned());
    }

    let lines = code.split('\n').count();
    if lines > MAX_SOURCE_LINES {
        warnings.push(format!(
            "Code has {lines} lines (consider breaking into functions)"
        ));
    }

    warnings
}

/// Whether any warning should stop execution under the blocking security mode
pub fn is_blocking(warnings: &[String]) -> bool {
    warnings.iter().any(|warning| {
        let lower = warning.to_lowercase();
        BLOCKING_KEYWORDS.iter().any(|kw| lower.contains(kw))
    })
}
