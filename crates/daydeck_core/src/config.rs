//! Process configuration for core services.
//!
//! # Responsibility
//! - Resolve the single configured timezone used for every "today",
//!   "tomorrow" and "next business day" computation.
//!
//! # Invariants
//! - An unset or blank `DAYDECK_TIMEZONE` falls back to `America/New_York`.
//! - An unknown timezone identifier is rejected, never silently replaced.

use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable holding the IANA timezone identifier.
pub const TIMEZONE_ENV_VAR: &str = "DAYDECK_TIMEZONE";
/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Identifier is not a known IANA timezone.
    UnknownTimezone(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTimezone(value) => write!(f, "unknown timezone identifier `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Core configuration shared by ingestion and planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    /// Zone in which local calendar days are interpreted.
    pub timezone: Tz,
}

impl CoreConfig {
    /// Builds configuration from an explicit timezone identifier.
    ///
    /// Blank input resolves to [`DEFAULT_TIMEZONE`].
    pub fn from_timezone_id(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        let id = if trimmed.is_empty() {
            DEFAULT_TIMEZONE
        } else {
            trimmed
        };
        let timezone = id
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(id.to_string()))?;
        Ok(Self { timezone })
    }

    /// Reads configuration from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = std::env::var(TIMEZONE_ENV_VAR).unwrap_or_default();
        Self::from_timezone_id(&value)
    }

    /// IANA identifier of the configured zone.
    pub fn timezone_id(&self) -> &'static str {
        self.timezone.name()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
        }
    }
}
