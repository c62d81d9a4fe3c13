//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                             - Index (record counts, visit counter)
//!
//! # Manufacturers
//! GET  /manufacturers/               - Manufacturer list (?name=, ?page=)
//! GET  /manufacturers/create/        - New manufacturer form
//! POST /manufacturers/create/        - Create manufacturer
//! POST /manufacturers/{id}/delete/   - Delete manufacturer and its cars
//!
//! # Cars
//! GET  /cars/                        - Car list (?model=, ?page=)
//! GET  /cars/create/                 - New car form
//! POST /cars/create/                 - Create car
//! GET  /cars/{id}/                   - Car detail
//!
//! # Drivers
//! GET  /drivers/                     - Driver list (?username=, ?page=)
//! GET  /drivers/create/              - New driver form
//! POST /drivers/create/              - Create driver
//! GET  /drivers/{id}/                - Driver detail
//!
//! # Accounts
//! GET  /accounts/login/              - Login page
//! POST /accounts/login/              - Login action
//! POST /accounts/logout/             - Logout action
//! ```
//!
//! Every route except the login page requires a logged-in driver.

pub mod auth;
pub mod cars;
pub mod drivers;
pub mod index;
pub mod listing;
pub mod manufacturers;

use axum::{
    Router,
    routing::{get, post},
};

use taxi_core::{CarId, DriverId, ManufacturerId};

use crate::error::AppError;
use crate::state::AppState;

/// Named routes with fixed paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteName {
    Index,
    ManufacturerList,
    ManufacturerCreate,
    CarList,
    CarCreate,
    DriverList,
    DriverCreate,
    Login,
    Logout,
}

impl RouteName {
    /// The URL path this route is served at.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Index => "/",
            Self::ManufacturerList => "/manufacturers/",
            Self::ManufacturerCreate => "/manufacturers/create/",
            Self::CarList => "/cars/",
            Self::CarCreate => "/cars/create/",
            Self::DriverList => "/drivers/",
            Self::DriverCreate => "/drivers/create/",
            Self::Login => "/accounts/login/",
            Self::Logout => "/accounts/logout/",
        }
    }
}

/// Path of the car-detail route for `id`.
#[must_use]
pub fn car_detail_path(id: CarId) -> String {
    format!("/cars/{id}/")
}

/// Path of the driver-detail route for `id`.
#[must_use]
pub fn driver_detail_path(id: DriverId) -> String {
    format!("/drivers/{id}/")
}

/// Path of the manufacturer-delete route for `id`.
#[must_use]
pub fn manufacturer_delete_path(id: ManufacturerId) -> String {
    format!("/manufacturers/{id}/delete/")
}

/// Parse an `{id}` path segment, treating anything non-numeric as unknown.
pub(crate) fn parse_id<T: From<i32>>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse::<i32>()
        .map(T::from)
        .map_err(|_| AppError::NotFound(format!("{what} {raw}")))
}

/// Create all routes for the web application.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(RouteName::Index.path(), get(index::index))
        // Manufacturers
        .route(
            RouteName::ManufacturerList.path(),
            get(manufacturers::list),
        )
        .route(
            RouteName::ManufacturerCreate.path(),
            get(manufacturers::new_form).post(manufacturers::create),
        )
        .route("/manufacturers/{id}/delete/", post(manufacturers::delete))
        // Cars
        .route(RouteName::CarList.path(), get(cars::list))
        .route(
            RouteName::CarCreate.path(),
            get(cars::new_form).post(cars::create),
        )
        .route("/cars/{id}/", get(cars::detail))
        // Drivers
        .route(RouteName::DriverList.path(), get(drivers::list))
        .route(
            RouteName::DriverCreate.path(),
            get(drivers::new_form).post(drivers::create),
        )
        .route("/drivers/{id}/", get(drivers::detail))
        // Accounts
        .route(
            RouteName::Login.path(),
            get(auth::login_page).post(auth::login),
        )
        .route(RouteName::Logout.path(), post(auth::logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(RouteName::Index.path(), "/");
        assert_eq!(RouteName::DriverList.path(), "/drivers/");
        assert_eq!(RouteName::Login.path(), "/accounts/login/");
    }

    #[test]
    fn test_detail_paths() {
        assert_eq!(car_detail_path(CarId::new(3)), "/cars/3/");
        assert_eq!(driver_detail_path(DriverId::new(7)), "/drivers/7/");
        assert_eq!(
            manufacturer_delete_path(ManufacturerId::new(2)),
            "/manufacturers/2/delete/"
        );
    }

    #[test]
    fn test_parse_id() {
        let id: CarId = parse_id("12", "car").unwrap_or_else(|_| CarId::new(0));
        assert_eq!(id, CarId::new(12));
        assert!(matches!(
            parse_id::<CarId>("abc", "car"),
            Err(AppError::NotFound(_))
        ));
    }
}
