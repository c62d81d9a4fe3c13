//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use taxi_core::{DriverId, Username};

use super::Driver;

/// Session-stored driver identity.
///
/// Minimal data stored in the session to identify the logged-in driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentDriver {
    /// Driver's database ID.
    pub id: DriverId,
    /// Driver's username.
    pub username: Username,
}

impl From<&Driver> for CurrentDriver {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            username: driver.username.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in driver.
    pub const CURRENT_DRIVER: &str = "current_driver";

    /// Key for the per-session index page visit counter.
    pub const NUM_VISITS: &str = "num_visits";
}
