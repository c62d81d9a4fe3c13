//! Driver domain types.
//!
//! Drivers are the service's user accounts: they log in with their username
//! and own the session identity.

use chrono::{DateTime, Utc};

use taxi_core::{DriverId, LicenseNumber, Username};

/// A driver (domain type).
///
/// The password hash is deliberately absent; it is only ever read through
/// `TaxiStore::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    /// Unique driver ID.
    pub id: DriverId,
    /// Login name, unique across drivers.
    pub username: Username,
    /// Given name (may be empty).
    pub first_name: String,
    /// Family name (may be empty).
    pub last_name: String,
    /// License number, unique across drivers when set.
    pub license_number: Option<LicenseNumber>,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl Driver {
    /// Full name for display, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.to_string()
        } else {
            full.to_owned()
        }
    }
}

/// Validated input for creating a driver (password handled separately).
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub license_number: Option<LicenseNumber>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn driver(first: &str, last: &str) -> Driver {
        Driver {
            id: DriverId::new(1),
            username: Username::parse("driver1").unwrap(),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            license_number: None,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(driver("Ann", "Lee").display_name(), "Ann Lee");
        assert_eq!(driver("Ann", "").display_name(), "Ann");
        assert_eq!(driver("", "").display_name(), "driver1");
    }
}
