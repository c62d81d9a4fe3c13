//! Manufacturer domain types.

use taxi_core::{ManufacturerId, TextField};

/// A vehicle maker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub country: String,
}

/// Validated input for creating a manufacturer.
#[derive(Debug, Clone)]
pub struct NewManufacturer {
    pub name: TextField,
    pub country: TextField,
}
