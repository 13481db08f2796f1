//! Fragment mode classification.
//!
//! Explicit prefixes (`work:`, `family -`, `todo:` ...) win; then a bare
//! leading `todo`/`task` word; then the work keyword heuristic.

use crate::model::Category;
use once_cell::sync::Lazy;
use regex::Regex;

static MODE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(work|personal|family|todo|task)\s*[:\-]\s*(.+)$")
        .expect("valid mode prefix regex")
});
static BARE_TODO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:todo|task)\s+(.+)$").expect("valid bare todo regex"));

const MODE_PREFIXES: &[(&str, IngestMode)] = &[
    ("work", IngestMode::Work),
    ("personal", IngestMode::Personal),
    ("family", IngestMode::Personal),
    ("todo", IngestMode::Todo),
    ("task", IngestMode::Todo),
];

/// Case-insensitive substrings that mark a fragment as work related.
pub const WORK_KEYWORDS: &[&str] = &[
    "standup", "scrum", "sync", "demo", "retro", "planning", "sprint", "jira", "qa", "fe",
    "backend", "frontend", "1:1",
];

/// What an ingested fragment should become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    Work,
    Personal,
    Todo,
    /// No signal; treated as personal.
    Unknown,
}

impl IngestMode {
    /// Category for events created from this mode.
    pub fn event_category(self) -> Category {
        match self {
            Self::Work => Category::Work,
            Self::Personal | Self::Todo | Self::Unknown => Category::Personal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Todo => "todo",
            Self::Unknown => "unknown",
        }
    }
}

/// Classification result; `body` borrows from the input fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    pub mode: IngestMode,
    pub body: &'a str,
}

/// Whether `text` contains any work keyword (case-insensitive substring).
pub fn looks_work_related(text: &str) -> bool {
    let lower = text.to_lowercase();
    WORK_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Classifies one normalized fragment.
pub fn classify(fragment: &str) -> Classified<'_> {
    if let Some(caps) = MODE_PREFIX_RE.captures(fragment) {
        if let (Some(prefix), Some(body)) = (caps.get(1), caps.get(2)) {
            let prefix = prefix.as_str().to_lowercase();
            if let Some((_, mode)) = MODE_PREFIXES.iter().find(|(name, _)| *name == prefix) {
                return Classified {
                    mode: *mode,
                    body: body.as_str(),
                };
            }
        }
    }

    if let Some(body) = BARE_TODO_RE.captures(fragment).and_then(|caps| caps.get(1)) {
        return Classified {
            mode: IngestMode::Todo,
            body: body.as_str(),
        };
    }

    let mode = if looks_work_related(fragment) {
        IngestMode::Work
    } else {
        IngestMode::Unknown
    };
    Classified {
        mode,
        body: fragment,
    }
}
