//! In-process store.
//!
//! Mirrors the Postgres schema's constraints (unique usernames and license
//! numbers, cars cascade with their manufacturer) so tests exercise the same
//! behaviour the database enforces.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use taxi_core::{CarId, DriverId, ManufacturerId, Page, PageRequest, Username};

use super::{
    CarFilter, DriverFilter, EntityCounts, ManufacturerFilter, RepositoryError, TaxiStore,
};
use crate::models::{Car, Driver, Manufacturer, NewCar, NewDriver, NewManufacturer};

#[derive(Debug, Clone)]
struct CarRecord {
    model: String,
    manufacturer_id: ManufacturerId,
}

#[derive(Debug, Clone)]
struct DriverRecord {
    driver: Driver,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Tables {
    manufacturers: BTreeMap<ManufacturerId, Manufacturer>,
    cars: BTreeMap<CarId, CarRecord>,
    drivers: BTreeMap<DriverId, DriverRecord>,
    last_id: i32,
}

impl Tables {
    const fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn car(&self, id: CarId, record: &CarRecord) -> Result<Car, RepositoryError> {
        let manufacturer = self
            .manufacturers
            .get(&record.manufacturer_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "car {id} references missing manufacturer {}",
                    record.manufacturer_id
                ))
            })?;

        Ok(Car {
            id,
            model: record.model.clone(),
            manufacturer,
        })
    }
}

/// A [`TaxiStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(value: &str, term: &str) -> bool {
    value.to_lowercase().contains(&term.to_lowercase())
}

#[async_trait]
impl TaxiStore for InMemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn counts(&self) -> Result<EntityCounts, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(EntityCounts {
            manufacturers: tables.manufacturers.len() as u64,
            cars: tables.cars.len() as u64,
            drivers: tables.drivers.len() as u64,
        })
    }

    async fn list_manufacturers(
        &self,
        filter: &ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, RepositoryError> {
        let tables = self.tables.read().await;
        let matching: Vec<Manufacturer> = tables
            .manufacturers
            .values()
            .filter(|m| {
                filter
                    .name
                    .as_deref()
                    .is_none_or(|term| contains_ignore_case(&m.name, term))
            })
            .cloned()
            .collect();

        Ok(Page::from_all(matching, page))
    }

    async fn all_manufacturers(&self) -> Result<Vec<Manufacturer>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.manufacturers.values().cloned().collect())
    }

    async fn get_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> Result<Option<Manufacturer>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.manufacturers.get(&id).cloned())
    }

    async fn create_manufacturer(
        &self,
        new: &NewManufacturer,
    ) -> Result<Manufacturer, RepositoryError> {
        let mut tables = self.tables.write().await;
        let manufacturer = Manufacturer {
            id: ManufacturerId::new(tables.next_id()),
            name: new.name.to_string(),
            country: new.country.to_string(),
        };
        tables
            .manufacturers
            .insert(manufacturer.id, manufacturer.clone());
        Ok(manufacturer)
    }

    async fn delete_manufacturer(&self, id: ManufacturerId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.manufacturers.remove(&id).is_none() {
            return Ok(false);
        }
        tables.cars.retain(|_, car| car.manufacturer_id != id);
        Ok(true)
    }

    async fn list_cars(
        &self,
        filter: &CarFilter,
        page: PageRequest,
    ) -> Result<Page<Car>, RepositoryError> {
        let tables = self.tables.read().await;
        let matching = tables
            .cars
            .iter()
            .filter(|(_, record)| {
                filter
                    .model
                    .as_deref()
                    .is_none_or(|term| contains_ignore_case(&record.model, term))
            })
            .map(|(id, record)| tables.car(*id, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::from_all(matching, page))
    }

    async fn get_car(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .cars
            .get(&id)
            .map(|record| tables.car(id, record))
            .transpose()
    }

    async fn create_car(&self, new: &NewCar) -> Result<Car, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.manufacturers.contains_key(&new.manufacturer_id) {
            return Err(RepositoryError::NotFound);
        }

        let id = CarId::new(tables.next_id());
        let record = CarRecord {
            model: new.model.to_string(),
            manufacturer_id: new.manufacturer_id,
        };
        let car = tables.car(id, &record)?;
        tables.cars.insert(id, record);
        Ok(car)
    }

    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        page: PageRequest,
    ) -> Result<Page<Driver>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Driver> = tables
            .drivers
            .values()
            .map(|record| &record.driver)
            .filter(|driver| filter.matches(driver))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(Page::from_all(matching, page))
    }

    async fn get_driver(&self, id: DriverId) -> Result<Option<Driver>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.drivers.get(&id).map(|record| record.driver.clone()))
    }

    async fn create_driver(
        &self,
        new: &NewDriver,
        password_hash: &str,
    ) -> Result<Driver, RepositoryError> {
        let mut tables = self.tables.write().await;

        for record in tables.drivers.values() {
            if record.driver.username == new.username {
                return Err(RepositoryError::Conflict(
                    "username already exists".to_owned(),
                ));
            }
            if new.license_number.is_some()
                && record.driver.license_number == new.license_number
            {
                return Err(RepositoryError::Conflict(
                    "license number already exists".to_owned(),
                ));
            }
        }

        let driver = Driver {
            id: DriverId::new(tables.next_id()),
            username: new.username.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            license_number: new.license_number.clone(),
            date_joined: Utc::now(),
        };
        tables.drivers.insert(
            driver.id,
            DriverRecord {
                driver: driver.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(driver)
    }

    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Driver, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .drivers
            .values()
            .find(|record| &record.driver.username == username)
            .map(|record| (record.driver.clone(), record.password_hash.clone())))
    }
}
