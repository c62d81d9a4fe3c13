//! Text matching for list filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a search term is compared against a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Case-insensitive substring match.
    #[default]
    Contains,
    /// Case-sensitive whole-value match.
    Exact,
}

/// Error returned when parsing an unknown [`SearchMode`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown search mode {0:?} (expected \"contains\" or \"exact\")")]
pub struct SearchModeError(String);

impl SearchMode {
    /// Whether `value` matches `term` under this mode.
    ///
    /// ```
    /// use taxi_core::SearchMode;
    ///
    /// assert!(SearchMode::Contains.matches("Driver1", "river"));
    /// assert!(!SearchMode::Exact.matches("Driver1", "driver1"));
    /// ```
    #[must_use]
    pub fn matches(self, value: &str, term: &str) -> bool {
        match self {
            Self::Contains => value.to_lowercase().contains(&term.to_lowercase()),
            Self::Exact => value == term,
        }
    }

    /// The configuration spelling of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "exact" => Ok(Self::Exact),
            other => Err(SearchModeError(other.to_owned())),
        }
    }
}
