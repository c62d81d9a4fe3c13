//! Driver license number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`LicenseNumber`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseNumberError {
    /// The input is not exactly 8 characters long.
    #[error("license number must be exactly {expected} characters")]
    WrongLength {
        /// Required length.
        expected: usize,
    },
    /// The first three characters are not uppercase letters.
    #[error("license number must start with 3 uppercase letters")]
    InvalidPrefix,
    /// The last five characters are not digits.
    #[error("license number must end with 5 digits")]
    InvalidSuffix,
}

/// A driver's license number, e.g. `ABC12345`.
///
/// ## Constraints
///
/// - Exactly 8 ASCII characters
/// - Characters 1-3: uppercase letters `A-Z`
/// - Characters 4-8: digits `0-9`
///
/// ```
/// use taxi_core::LicenseNumber;
///
/// assert!(LicenseNumber::parse("ABC12345").is_ok());
/// assert!(LicenseNumber::parse("abc12345").is_err());
/// assert!(LicenseNumber::parse("ABC1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseNumber(String);

impl LicenseNumber {
    /// Total length of a license number.
    pub const LENGTH: usize = 8;
    const PREFIX_LENGTH: usize = 3;

    /// Parse a `LicenseNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 8 characters, does not start with
    /// three uppercase ASCII letters, or does not end with five ASCII digits.
    pub fn parse(s: &str) -> Result<Self, LicenseNumberError> {
        if s.len() != Self::LENGTH || !s.is_ascii() {
            return Err(LicenseNumberError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        let (prefix, suffix) = s.split_at(Self::PREFIX_LENGTH);

        if !prefix.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(LicenseNumberError::InvalidPrefix);
        }

        if !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LicenseNumberError::InvalidSuffix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the license number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LicenseNumber {
    type Err = LicenseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LicenseNumber {
    type Error = LicenseNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LicenseNumber> for String {
    fn from(license: LicenseNumber) -> Self {
        license.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for LicenseNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for LicenseNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for LicenseNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(LicenseNumber::parse("ABC12345").is_ok());
        assert!(LicenseNumber::parse("DEF67890").is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        let expected = Err(LicenseNumberError::WrongLength { expected: 8 });
        assert_eq!(LicenseNumber::parse(""), expected);
        assert_eq!(LicenseNumber::parse("ABC1234"), expected);
        assert_eq!(LicenseNumber::parse("ABC123456"), expected);
        // 8 bytes but not 8 ASCII characters
        assert_eq!(LicenseNumber::parse("ÄB12345"), expected);
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert_eq!(
            LicenseNumber::parse("abc12345"),
            Err(LicenseNumberError::InvalidPrefix)
        );
        assert_eq!(
            LicenseNumber::parse("AB123456"),
            Err(LicenseNumberError::InvalidPrefix)
        );
    }

    #[test]
    fn test_parse_invalid_suffix() {
        assert_eq!(
            LicenseNumber::parse("ABCD2345"),
            Err(LicenseNumberError::InvalidSuffix)
        );
        assert_eq!(
            LicenseNumber::parse("ABC1234X"),
            Err(LicenseNumberError::InvalidSuffix)
        );
    }
}
