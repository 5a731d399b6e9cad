//! Output comparison strategies
//!
//! Pure functions deciding whether a program's output matches the expected
//! output of a test case. A mismatch carries a human-readable message.

use regex::Regex;

use crate::types::ComparisonMode;

/// Trim and collapse internal whitespace runs to single spaces
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compare `actual` against `expected` under the given mode
///
/// `actual` is expected to be stripped by the caller already. Returns
/// `(true, None)` on a match and `(false, Some(message))` otherwise; invalid
/// patterns and unknown modes are reported as mismatches.
pub fn compare(actual: &str, expected: &str, mode: &ComparisonMode) -> (bool, Option<String>) {
    match mode {
        ComparisonMode::Exact => {
            if actual == expected {
                (true, None)
            } else {
                (false, Some(format!("Expected {expected:?}, got {actual:?}")))
            }
        }
        ComparisonMode::Normalized => {
            let actual = normalize(actual);
            let expected = normalize(expected);
            if actual == expected {
                (true, None)
            } else {
                (false, Some(format!("Expected {expected:?}, got {actual:?}")))
            }
        }
        ComparisonMode::Regex => match full_match(expected) {
            Ok(pattern) if pattern.is_match(actual) => (true, None),
            Ok(_) => (
                false,
                Some(format!(
                    "Output {actual:?} doesn't match pattern {expected:?}"
                )),
            ),
            Err(e) => (false, Some(format!("Invalid regex pattern: {e}"))),
        },
        ComparisonMode::Contains => {
            if actual.contains(expected) {
                (true, None)
            } else {
                (
                    false,
                    Some(format!(
                        "Expected output to contain {expected:?}, got {actual:?}"
                    )),
                )
            }
        }
        ComparisonMode::Unknown(name) => (false, Some(format!("Unknown comparison mode: {name}"))),
    }
}

/// Compile a pattern anchored at both ends of the input
fn full_match(pattern: &str) -> Result<Regex, regex::Error> {
    // Validate the bare pattern first so error messages point at user input
    Regex::new(pattern)?;
    Regex::new(&format!(r"\A(?:{pattern})\z"))
        // a trailing verbose-mode comment swallows the closing group
        .or_else(|_| Regex::new(&format!("\\A(?:{pattern}\n)\\z")))
}
