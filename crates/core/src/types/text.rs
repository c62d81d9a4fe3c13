//! Required, bounded text fields (manufacturer name, country, car model).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`TextField`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFieldError {
    /// The input is empty or whitespace only.
    #[error("this field is required")]
    Empty,
    /// The input is too long.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A required single-line text value.
///
/// Surrounding whitespace is trimmed on parse; the trimmed value must be
/// non-empty and at most 255 characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct TextField(String);

impl TextField {
    /// Maximum length, in characters.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `TextField`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `TextFieldError::Empty` for blank input and
    /// `TextFieldError::TooLong` when the trimmed value exceeds 255 characters.
    pub fn parse(s: &str) -> Result<Self, TextFieldError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TextFieldError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(TextFieldError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the field and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TextField {
    type Error = TextFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TextField> for String {
    fn from(field: TextField) -> Self {
        field.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let field = TextField::parse("  Toyota ").unwrap();
        assert_eq!(field.as_str(), "Toyota");
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(TextField::parse(""), Err(TextFieldError::Empty));
        assert_eq!(TextField::parse(" \t "), Err(TextFieldError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(TextField::parse(&"x".repeat(255)).is_ok());
        assert_eq!(
            TextField::parse(&"x".repeat(256)),
            Err(TextFieldError::TooLong { max: 255 })
        );
    }
}
