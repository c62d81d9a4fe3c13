//! Domain models for the taxi service.
//!
//! These are validated domain objects, separate from database row types.

pub mod car;
pub mod driver;
pub mod manufacturer;
pub mod session;

pub use car::{Car, NewCar};
pub use driver::{Driver, NewDriver};
pub use manufacturer::{Manufacturer, NewManufacturer};
pub use session::{CurrentDriver, keys as session_keys};
