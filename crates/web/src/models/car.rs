//! Car domain types.

use taxi_core::{CarId, ManufacturerId, TextField};

use super::Manufacturer;

/// A vehicle model, always attached to the manufacturer that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    pub manufacturer: Manufacturer,
}

/// Validated input for creating a car.
///
/// The manufacturer must already exist; stores reject unknown IDs with
/// `RepositoryError::NotFound`.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub model: TextField,
    pub manufacturer_id: ManufacturerId,
}
