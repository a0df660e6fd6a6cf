//! Formatted output helpers for CLI commands.
//!
//! Errors go to stderr, one per line, so the plan and summary lines on
//! stdout stay parseable.

use std::fmt::Display;

/// Prints every error and returns a summary error for the command.
pub fn fail<E: Display>(context: &str, errors: &[E]) -> anyhow::Error {
    print_errors(errors);
    anyhow::anyhow!("{} while {context}", count(errors.len(), "error"))
}

/// Prints every error to stderr, one per line.
pub fn print_errors<E: Display>(errors: &[E]) {
    #[allow(clippy::print_stderr)]
    for error in errors {
        eprintln!("  \u{2717} {error}");
    }
}

/// Formats `n` followed by `noun`, pluralized with a trailing `s`.
#[must_use]
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Underline of the same width as `title`.
#[must_use]
pub fn rule(title: &str) -> String {
    "\u{2550}".repeat(title.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(0, "config"), "0 configs");
        assert_eq!(count(1, "config"), "1 config");
        assert_eq!(count(3, "error"), "3 errors");
    }

    #[test]
    fn rule_matches_title_width() {
        assert_eq!(rule("dev").chars().count(), 3);
        assert_eq!(rule("Plan \u{2192} prod").chars().count(), 11);
    }

    #[test]
    fn fail_summarizes_error_count() {
        let err = fail("deploying", &["a", "b"]);
        assert_eq!(err.to_string(), "2 errors while deploying");
    }
}
