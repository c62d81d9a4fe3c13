//! Demo data for empty stores.
//!
//! Used by `taxi-cli seed` and by the in-memory demo mode. Seeding is skipped
//! when any manufacturer, car, or driver already exists.

use taxi_core::{LicenseNumber, TextField, Username};
use thiserror::Error;

use crate::db::{RepositoryError, TaxiStore};
use crate::models::{NewCar, NewDriver, NewManufacturer};
use crate::services::auth::{AuthError, AuthService, validate_password};

/// Manufacturers as `(name, country)`.
const MANUFACTURERS: &[(&str, &str)] = &[
    ("Toyota", "Japan"),
    ("Volkswagen", "Germany"),
    ("Ford", "USA"),
];

/// Cars as `(model, index into MANUFACTURERS)`.
const CARS: &[(&str, usize)] = &[
    ("Corolla", 0),
    ("Camry", 0),
    ("Golf", 1),
    ("Passat", 1),
    ("Focus", 2),
    ("Mondeo", 2),
];

/// Drivers as `(username, first name, last name, license number)`.
const DRIVERS: &[(&str, &str, &str, &str)] = &[
    ("admin", "Ada", "Admin", "ADM00001"),
    ("driver1", "Ann", "Lee", "ABC12345"),
    ("driver2", "Bob", "Stone", "BCD23456"),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("driver registration failed: {0}")]
    Auth(#[from] AuthError),

    #[error("invalid seed record: {0}")]
    InvalidRecord(String),
}

/// What a seed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already had data; nothing was written.
    Skipped,
    /// Demo records were inserted.
    Seeded {
        manufacturers: usize,
        cars: usize,
        drivers: usize,
    },
}

/// Insert demo manufacturers, cars, and drivers into an empty store.
///
/// Every demo driver gets `password`.
///
/// # Errors
///
/// Returns `SeedError` if the store fails or `password` is too weak.
pub async fn seed_demo_data(
    store: &dyn TaxiStore,
    password: &str,
) -> Result<SeedOutcome, SeedError> {
    validate_password(password)?;

    let counts = store.counts().await?;
    if counts.manufacturers + counts.cars + counts.drivers > 0 {
        tracing::info!(?counts, "Store already has data, skipping seed");
        return Ok(SeedOutcome::Skipped);
    }

    let mut manufacturer_ids = Vec::with_capacity(MANUFACTURERS.len());
    for (name, country) in MANUFACTURERS {
        let new = NewManufacturer {
            name: text(name)?,
            country: text(country)?,
        };
        manufacturer_ids.push(store.create_manufacturer(&new).await?.id);
    }

    for (model, index) in CARS {
        let manufacturer_id = *manufacturer_ids
            .get(*index)
            .ok_or_else(|| SeedError::InvalidRecord(format!("car {model}: no manufacturer")))?;
        let new = NewCar {
            model: text(model)?,
            manufacturer_id,
        };
        store.create_car(&new).await?;
    }

    let auth = AuthService::new(store);
    for (username, first_name, last_name, license) in DRIVERS {
        let new = NewDriver {
            username: Username::parse(username)
                .map_err(|e| SeedError::InvalidRecord(format!("{username}: {e}")))?,
            first_name: (*first_name).to_owned(),
            last_name: (*last_name).to_owned(),
            license_number: Some(
                LicenseNumber::parse(license)
                    .map_err(|e| SeedError::InvalidRecord(format!("{license}: {e}")))?,
            ),
        };
        auth.register_driver(&new, password).await?;
    }

    tracing::info!(
        manufacturers = MANUFACTURERS.len(),
        cars = CARS.len(),
        drivers = DRIVERS.len(),
        "Demo data seeded"
    );

    Ok(SeedOutcome::Seeded {
        manufacturers: MANUFACTURERS.len(),
        cars: CARS.len(),
        drivers: DRIVERS.len(),
    })
}

fn text(value: &str) -> Result<TextField, SeedError> {
    TextField::parse(value).map_err(|e| SeedError::InvalidRecord(format!("{value}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use taxi_core::PageRequest;

    use super::*;
    use crate::db::{DriverFilter, InMemoryStore};

    #[tokio::test]
    async fn test_seed_populates_empty_store() {
        let store = InMemoryStore::new();

        let outcome = seed_demo_data(&store, "demo-password").await.unwrap();
        assert_eq!(
            outcome,
            SeedOutcome::Seeded {
                manufacturers: 3,
                cars: 6,
                drivers: 3
            }
        );

        let counts = store.counts().await.unwrap();
        assert_eq!((counts.manufacturers, counts.cars, counts.drivers), (3, 6, 3));

        let drivers = store
            .list_drivers(
                &DriverFilter::new(Some("driver1"), taxi_core::SearchMode::Exact),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(drivers.items().len(), 1);

        let driver = AuthService::new(&store)
            .login("driver1", "demo-password")
            .await
            .unwrap();
        assert_eq!(driver.username.as_str(), "driver1");
    }

    #[tokio::test]
    async fn test_seed_skips_populated_store() {
        let store = InMemoryStore::new();
        seed_demo_data(&store, "demo-password").await.unwrap();

        let outcome = seed_demo_data(&store, "demo-password").await.unwrap();
        assert_eq!(outcome, SeedOutcome::Skipped);
        assert_eq!(store.counts().await.unwrap().drivers, 3);
    }

    #[tokio::test]
    async fn test_seed_rejects_weak_password() {
        let store = InMemoryStore::new();
        let err = seed_demo_data(&store, "short").await.unwrap_err();
        assert!(matches!(err, SeedError::Auth(AuthError::WeakPassword(_))));
        assert_eq!(store.counts().await.unwrap().manufacturers, 0);
    }
}
