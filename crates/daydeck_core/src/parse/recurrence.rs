//! Recurrence keyword scan (`mon-fri`, `weekdays`, `mon-thu`, `daily`).

use crate::model::event::DaySet;
use crate::parse::normalize_text;

/// Ordered rule table; the first rule with a matching keyword wins.
///
/// Longer spellings precede their prefixes so the reported keyword is the
/// whole word found in the text.
const RECURRENCE_RULES: &[(&[&str], DaySet)] = &[
    (&["mon-fri", "m-f", "m–f", "weekdays"], DaySet::WEEKDAYS),
    (&["mon-thurs", "mon-thu"], DaySet::MON_TO_THU),
    (&["daily"], DaySet::EVERY_DAY),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub days: DaySet,
    /// Keyword that triggered the match, lower-case.
    pub keyword: &'static str,
}

/// Case-insensitive substring scan of `text` for recurrence keywords.
pub fn parse_recurrence(text: &str) -> Option<Recurrence> {
    let lower = text.to_lowercase();
    RECURRENCE_RULES.iter().find_map(|(keywords, days)| {
        keywords
            .iter()
            .find(|keyword| lower.contains(*keyword))
            .map(|keyword| Recurrence {
                days: *days,
                keyword: *keyword,
            })
    })
}

/// Removes standalone occurrences of `keyword` from `title`.
pub fn strip_recurrence_keyword(title: &str, keyword: &str) -> String {
    let kept = title
        .split_whitespace()
        .filter(|word| word.to_lowercase() != keyword)
        .collect::<Vec<_>>()
        .join(" ");
    normalize_text(&kept)
}
