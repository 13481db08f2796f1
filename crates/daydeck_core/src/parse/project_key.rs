//! Leading project-key reference (`FE: ...`, `ATHENA - ...`).

use once_cell::sync::Lazy;
use regex::Regex;

static PROJECT_KEY_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_\-]{1,15})\s*[:\-]\s*(.+)$")
        .expect("valid project key prefix regex")
});

/// Body split into an optional upper-cased key candidate and the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectKeyRef<'a> {
    pub key: Option<String>,
    pub rest: &'a str,
}

/// Splits a leading project key off `body`.
///
/// The key is only a candidate; whether a project exists is decided by the
/// caller's lookup.
pub fn split_project_key(body: &str) -> ProjectKeyRef<'_> {
    if let Some(caps) = PROJECT_KEY_PREFIX_RE.captures(body) {
        if let (Some(key), Some(rest)) = (caps.get(1), caps.get(2)) {
            return ProjectKeyRef {
                key: Some(key.as_str().to_uppercase()),
                rest: rest.as_str(),
            };
        }
    }
    ProjectKeyRef {
        key: None,
        rest: body,
    }
}
