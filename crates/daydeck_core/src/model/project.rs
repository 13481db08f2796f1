//! Project model.
//!
//! # Invariants
//! - `key` is upper-case, starts with a letter and is 2..=16 chars of
//!   `[A-Z0-9_-]`, so it can be referenced from ingested text.
//! - `key` is unique across all projects (enforced by storage).

use super::{require_text, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

static PROJECT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_-]{1,15}$").expect("valid project key regex"));

/// Named grouping used for labels and colors on events and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub key: String,
    pub name: String,
    pub color: String,
}

impl Project {
    /// Creates a project with a generated id; `key` is normalized upper-case.
    pub fn new(key: &str, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: normalize_project_key(key),
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if !PROJECT_KEY_RE.is_match(&self.key) {
            return Err(ModelValidationError::InvalidProjectKey(self.key.clone()));
        }
        require_text("project name", &self.name)
    }
}

/// Trims and upper-cases a user-supplied project key.
pub fn normalize_project_key(key: &str) -> String {
    key.trim().to_uppercase()
}
