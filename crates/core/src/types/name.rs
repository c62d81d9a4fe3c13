//! Optional personal names (driver first and last name).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PersonName`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonNameError {
    /// The input is too long.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A first or last name. May be blank.
///
/// Surrounding whitespace is trimmed on parse; the trimmed value must be at
/// most 150 characters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Maximum length, in characters.
    pub const MAX_LENGTH: usize = 150;

    /// Parse a `PersonName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PersonNameError::TooLong` when the trimmed value exceeds
    /// 150 characters.
    pub fn parse(s: &str) -> Result<Self, PersonNameError> {
        let trimmed = s.trim();
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PersonName {
    type Error = PersonNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PersonName> for String {
    fn from(name: PersonName) -> Self {
        name.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_allowed() {
        assert_eq!(PersonName::parse("   ").unwrap().as_str(), "");
        assert_eq!(PersonName::parse(" Ann ").unwrap().as_str(), "Ann");
    }

    #[test]
    fn test_parse_too_long() {
        assert!(PersonName::parse(&"é".repeat(150)).is_ok());
        assert_eq!(
            PersonName::parse(&"x".repeat(151)),
            Err(PersonNameError::TooLong { max: 150 })
        );
    }
}
