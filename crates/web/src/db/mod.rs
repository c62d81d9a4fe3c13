//! Persistence for the taxi service.
//!
//! # Database: `taxi`
//!
//! ## Tables
//!
//! - `taxi.manufacturer` - Vehicle makers
//! - `taxi.car` - Vehicle models (`manufacturer_id` cascades on delete)
//! - `taxi.driver` - Driver accounts and password hashes
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p taxi-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers talk to a [`TaxiStore`]. [`PgStore`] is the production
//! implementation; [`InMemoryStore`] backs tests and the `TAXI_STORE=memory`
//! demo mode.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use taxi_core::{CarId, DriverId, ManufacturerId, Page, PageRequest, SearchMode, Username};

use crate::models::{Car, Driver, Manufacturer, NewCar, NewDriver, NewManufacturer};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested or referenced entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Record counts shown on the index page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub manufacturers: u64,
    pub cars: u64,
    pub drivers: u64,
}

/// Trim a raw search term, treating blank input as "no filter".
fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

/// Filter for the manufacturer list (`?name=`, case-insensitive substring).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufacturerFilter {
    pub name: Option<String>,
}

impl ManufacturerFilter {
    #[must_use]
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: normalize_term(name),
        }
    }
}

/// Filter for the car list (`?model=`, case-insensitive substring).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilter {
    pub model: Option<String>,
}

impl CarFilter {
    #[must_use]
    pub fn new(model: Option<&str>) -> Self {
        Self {
            model: normalize_term(model),
        }
    }
}

/// Filter for the driver list (`?username=`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverFilter {
    pub username: Option<String>,
    pub mode: SearchMode,
}

impl DriverFilter {
    #[must_use]
    pub fn new(username: Option<&str>, mode: SearchMode) -> Self {
        Self {
            username: normalize_term(username),
            mode,
        }
    }

    /// Whether a driver passes this filter.
    #[must_use]
    pub fn matches(&self, driver: &Driver) -> bool {
        self.username
            .as_deref()
            .is_none_or(|term| self.mode.matches(driver.username.as_str(), term))
    }
}

/// Storage operations needed by the web application.
///
/// List operations return one page of results; ordering is ascending ID for
/// manufacturers and cars, ascending username for drivers.
#[async_trait]
pub trait TaxiStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Count all manufacturers, cars, and drivers.
    async fn counts(&self) -> Result<EntityCounts, RepositoryError>;

    /// List one page of manufacturers.
    async fn list_manufacturers(
        &self,
        filter: &ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, RepositoryError>;

    /// List every manufacturer (for selection inputs).
    async fn all_manufacturers(&self) -> Result<Vec<Manufacturer>, RepositoryError>;

    /// Get a manufacturer by ID.
    async fn get_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> Result<Option<Manufacturer>, RepositoryError>;

    /// Create a manufacturer.
    async fn create_manufacturer(
        &self,
        new: &NewManufacturer,
    ) -> Result<Manufacturer, RepositoryError>;

    /// Delete a manufacturer and all of its cars.
    ///
    /// Returns `false` if the manufacturer did not exist.
    async fn delete_manufacturer(&self, id: ManufacturerId) -> Result<bool, RepositoryError>;

    /// List one page of cars with their manufacturers.
    async fn list_cars(
        &self,
        filter: &CarFilter,
        page: PageRequest,
    ) -> Result<Page<Car>, RepositoryError>;

    /// Get a car by ID.
    async fn get_car(&self, id: CarId) -> Result<Option<Car>, RepositoryError>;

    /// Create a car.
    ///
    /// Returns `RepositoryError::NotFound` if the manufacturer does not exist.
    async fn create_car(&self, new: &NewCar) -> Result<Car, RepositoryError>;

    /// List one page of drivers, ordered by username byte-wise.
    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        page: PageRequest,
    ) -> Result<Page<Driver>, RepositoryError>;

    /// Get a driver by ID.
    async fn get_driver(&self, id: DriverId) -> Result<Option<Driver>, RepositoryError>;

    /// Create a driver with an already-hashed password.
    ///
    /// Returns `RepositoryError::Conflict` if the username or license number
    /// is taken.
    async fn create_driver(
        &self,
        new: &NewDriver,
        password_hash: &str,
    ) -> Result<Driver, RepositoryError>;

    /// Get a driver and their password hash by username.
    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Driver, String)>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_terms_are_no_filter() {
        assert_eq!(ManufacturerFilter::new(Some("   ")).name, None);
        assert_eq!(CarFilter::new(Some("")).model, None);
        assert_eq!(DriverFilter::new(None, SearchMode::Exact).username, None);
    }

    #[test]
    fn test_terms_are_trimmed() {
        let filter = DriverFilter::new(Some(" driver1 "), SearchMode::Exact);
        assert_eq!(filter.username.as_deref(), Some("driver1"));
    }
}
