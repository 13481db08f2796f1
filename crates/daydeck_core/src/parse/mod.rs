//! Bounded free-text grammar used by message ingestion.
//!
//! # Responsibility
//! - Classify a fragment (task / work event / personal event).
//! - Extract project-key prefixes, clock ranges, recurrence words and
//!   "before/by <weekday>" due clauses.
//!
//! # Invariants
//! - Every parser is pure and returns an optional structured result; a miss
//!   is never an error, callers fall back to plain text.
//! - Each parser is an ordered rule table evaluated first-match-wins.

pub mod due_date;
pub mod mode;
pub mod project_key;
pub mod recurrence;
pub mod time_range;

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static FRAGMENT_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:\n|;)\s*").expect("valid fragment split regex"));

/// Trims and collapses internal whitespace runs to one space.
pub fn normalize_text(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Splits a message into normalized, non-empty fragments.
///
/// Fragments are delimited by newlines or `;`.
pub fn split_fragments(message: &str) -> Vec<String> {
    FRAGMENT_SPLIT_RE
        .split(message)
        .map(normalize_text)
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, split_fragments};

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  a \t b\u{a0} c  "), "a b c");
    }

    #[test]
    fn split_on_newlines_and_semicolons() {
        let fragments = split_fragments("work: standup 9-930am mon-fri ;todo: call mom\r\n\n  ; gym");
        assert_eq!(
            fragments,
            vec!["work: standup 9-930am mon-fri", "todo: call mom", "gym"]
        );
    }

    #[test]
    fn blank_message_has_no_fragments() {
        assert!(split_fragments(" ;\n ; ").is_empty());
    }
}
