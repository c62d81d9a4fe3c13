//! `PostgreSQL` implementation of [`TaxiStore`].
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use taxi_core::{
    CarId, DriverId, LicenseNumber, ManufacturerId, Page, PageRequest, PageWindow, SearchMode,
    Username,
};

use super::{
    CarFilter, DriverFilter, EntityCounts, ManufacturerFilter, RepositoryError, TaxiStore,
};
use crate::models::{Car, Driver, Manufacturer, NewCar, NewDriver, NewManufacturer};

const LICENSE_CONSTRAINT: &str = "driver_license_number_key";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CountsRow {
    manufacturers: i64,
    cars: i64,
    drivers: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ManufacturerRow {
    id: i32,
    name: String,
    country: String,
}

impl From<ManufacturerRow> for Manufacturer {
    fn from(row: ManufacturerRow) -> Self {
        Self {
            id: ManufacturerId::new(row.id),
            name: row.name,
            country: row.country,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: i32,
    model: String,
    manufacturer_id: i32,
    manufacturer_name: String,
    manufacturer_country: String,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Self {
            id: CarId::new(row.id),
            model: row.model,
            manufacturer: Manufacturer {
                id: ManufacturerId::new(row.manufacturer_id),
                name: row.manufacturer_name,
                country: row.manufacturer_country,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: i32,
    username: String,
    first_name: String,
    last_name: String,
    license_number: Option<String>,
    date_joined: DateTime<Utc>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = RepositoryError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let license_number = row
            .license_number
            .as_deref()
            .map(LicenseNumber::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid license number in database: {e}"))
            })?;

        Ok(Self {
            id: DriverId::new(row.id),
            username,
            first_name: row.first_name,
            last_name: row.last_name,
            license_number,
            date_joined: row.date_joined,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverAuthRow {
    #[sqlx(flatten)]
    driver: DriverRow,
    password_hash: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

fn limit_offset(window: PageWindow) -> (i64, i64) {
    (
        i64::from(window.limit()),
        i64::try_from(window.offset()).unwrap_or(i64::MAX),
    )
}

/// Build an `ILIKE` pattern matching `term` anywhere, escaping wildcards.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Split a driver filter into (exact, pattern) bind values.
fn driver_binds(filter: &DriverFilter) -> (Option<String>, Option<String>) {
    match (filter.username.as_deref(), filter.mode) {
        (None, _) => (None, None),
        (Some(term), SearchMode::Exact) => (Some(term.to_owned()), None),
        (Some(term), SearchMode::Contains) => (None, Some(contains_pattern(term))),
    }
}

// =============================================================================
// Store
// =============================================================================

/// A [`TaxiStore`] backed by the `taxi` schema in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaxiStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn counts(&self) -> Result<EntityCounts, RepositoryError> {
        let row = sqlx::query_as::<_, CountsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM taxi.manufacturer) AS manufacturers,
                (SELECT COUNT(*) FROM taxi.car) AS cars,
                (SELECT COUNT(*) FROM taxi.driver) AS drivers
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(EntityCounts {
            manufacturers: to_count(row.manufacturers),
            cars: to_count(row.cars),
            drivers: to_count(row.drivers),
        })
    }

    async fn list_manufacturers(
        &self,
        filter: &ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, RepositoryError> {
        let pattern = filter.name.as_deref().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM taxi.manufacturer
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let window = page.resolve(to_count(total));
        let (limit, offset) = limit_offset(window);

        let rows = sqlx::query_as::<_, ManufacturerRow>(
            r"
            SELECT id, name, country
            FROM taxi.manufacturer
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), window))
    }

    async fn all_manufacturers(&self) -> Result<Vec<Manufacturer>, RepositoryError> {
        let rows = sqlx::query_as::<_, ManufacturerRow>(
            "SELECT id, name, country FROM taxi.manufacturer ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> Result<Option<Manufacturer>, RepositoryError> {
        let row = sqlx::query_as::<_, ManufacturerRow>(
            "SELECT id, name, country FROM taxi.manufacturer WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_manufacturer(
        &self,
        new: &NewManufacturer,
    ) -> Result<Manufacturer, RepositoryError> {
        let row = sqlx::query_as::<_, ManufacturerRow>(
            r"
            INSERT INTO taxi.manufacturer (name, country)
            VALUES ($1, $2)
            RETURNING id, name, country
            ",
        )
        .bind(new.name.as_str())
        .bind(new.country.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_manufacturer(&self, id: ManufacturerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM taxi.manufacturer WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_cars(
        &self,
        filter: &CarFilter,
        page: PageRequest,
    ) -> Result<Page<Car>, RepositoryError> {
        let pattern = filter.model.as_deref().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM taxi.car
            WHERE ($1::text IS NULL OR model ILIKE $1)
            ",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let window = page.resolve(to_count(total));
        let (limit, offset) = limit_offset(window);

        let rows = sqlx::query_as::<_, CarRow>(
            r"
            SELECT c.id, c.model,
                   m.id AS manufacturer_id,
                   m.name AS manufacturer_name,
                   m.country AS manufacturer_country
            FROM taxi.car c
            JOIN taxi.manufacturer m ON m.id = c.manufacturer_id
            WHERE ($1::text IS NULL OR c.model ILIKE $1)
            ORDER BY c.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), window))
    }

    async fn get_car(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let row = sqlx::query_as::<_, CarRow>(
            r"
            SELECT c.id, c.model,
                   m.id AS manufacturer_id,
                   m.name AS manufacturer_name,
                   m.country AS manufacturer_country
            FROM taxi.car c
            JOIN taxi.manufacturer m ON m.id = c.manufacturer_id
            WHERE c.id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_car(&self, new: &NewCar) -> Result<Car, RepositoryError> {
        let row = sqlx::query_as::<_, CarRow>(
            r"
            WITH inserted AS (
                INSERT INTO taxi.car (model, manufacturer_id)
                VALUES ($1, $2)
                RETURNING id, model, manufacturer_id
            )
            SELECT i.id, i.model,
                   m.id AS manufacturer_id,
                   m.name AS manufacturer_name,
                   m.country AS manufacturer_country
            FROM inserted i
            JOIN taxi.manufacturer m ON m.id = i.manufacturer_id
            ",
        )
        .bind(new.model.as_str())
        .bind(new.manufacturer_id.as_i32())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        page: PageRequest,
    ) -> Result<Page<Driver>, RepositoryError> {
        let (exact, pattern) = driver_binds(filter);

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM taxi.driver
            WHERE ($1::text IS NULL OR username = $1)
              AND ($2::text IS NULL OR username ILIKE $2)
            ",
        )
        .bind(&exact)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let window = page.resolve(to_count(total));
        let (limit, offset) = limit_offset(window);

        let rows = sqlx::query_as::<_, DriverRow>(
            r#"
            SELECT id, username, first_name, last_name, license_number, date_joined
            FROM taxi.driver
            WHERE ($1::text IS NULL OR username = $1)
              AND ($2::text IS NULL OR username ILIKE $2)
            ORDER BY username COLLATE "C"
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&exact)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let drivers = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(drivers, window))
    }

    async fn get_driver(&self, id: DriverId) -> Result<Option<Driver>, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(
            r"
            SELECT id, username, first_name, last_name, license_number, date_joined
            FROM taxi.driver
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create_driver(
        &self,
        new: &NewDriver,
        password_hash: &str,
    ) -> Result<Driver, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(
            r"
            INSERT INTO taxi.driver
                (username, first_name, last_name, license_number, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, first_name, last_name, license_number, date_joined
            ",
        )
        .bind(new.username.as_str())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.license_number.as_ref().map(LicenseNumber::as_str))
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                let message = match db_err.constraint() {
                    Some(LICENSE_CONSTRAINT) => "license number already exists",
                    _ => "username already exists",
                };
                return RepositoryError::Conflict(message.to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(Driver, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, DriverAuthRow>(
            r"
            SELECT id, username, first_name, last_name, license_number, date_joined,
                   password_hash
            FROM taxi.driver
            WHERE username = $1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.driver.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use secrecy::SecretString;
    use taxi_core::{PageSelector, TextField};

    use super::*;

    /// Serializes the database tests; each one truncates the taxi tables.
    static DATABASE: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

    /// Connect to `TAXI_TEST_DATABASE_URL`, migrate, and start from empty tables.
    async fn empty_store() -> PgStore {
        let url = std::env::var("TAXI_TEST_DATABASE_URL").unwrap();
        let pool = crate::db::create_pool(&SecretString::from(url)).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        sqlx::query(
            "TRUNCATE taxi.car, taxi.manufacturer, taxi.driver RESTART IDENTITY CASCADE",
        )
        .execute(&pool)
        .await
        .unwrap();
        PgStore::new(pool)
    }

    async fn manufacturer(store: &PgStore, name: &str) -> Manufacturer {
        store
            .create_manufacturer(&NewManufacturer {
                name: TextField::parse(name).unwrap(),
                country: TextField::parse("Japan").unwrap(),
            })
            .await
            .unwrap()
    }

    async fn car(store: &PgStore, model: &str, manufacturer: &Manufacturer) -> Car {
        store
            .create_car(&NewCar {
                model: TextField::parse(model).unwrap(),
                manufacturer_id: manufacturer.id,
            })
            .await
            .unwrap()
    }

    async fn driver(store: &PgStore, username: &str, license: Option<&str>) -> Driver {
        store
            .create_driver(&new_driver(username, license), "hash")
            .await
            .unwrap()
    }

    fn new_driver(username: &str, license: Option<&str>) -> NewDriver {
        NewDriver {
            username: Username::parse(username).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            license_number: license.map(|l| LicenseNumber::parse(l).unwrap()),
        }
    }

    fn page(number: u32, size: u32) -> PageRequest {
        PageRequest::new(
            PageSelector::Number(NonZeroU32::new(number).unwrap()),
            NonZeroU32::new(size).unwrap(),
        )
    }

    fn usernames(page: &Page<Driver>) -> Vec<&str> {
        page.items().iter().map(|d| d.username.as_str()).collect()
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("driver"), "%driver%");
        assert_eq!(contains_pattern("a_b%c"), "%a\\_b\\%c%");
        assert_eq!(contains_pattern("x\\y"), "%x\\\\y%");
    }

    #[test]
    fn test_driver_binds_follow_mode() {
        let exact = DriverFilter::new(Some("driver1"), SearchMode::Exact);
        assert_eq!(driver_binds(&exact), (Some("driver1".to_owned()), None));

        let contains = DriverFilter::new(Some("driver1"), SearchMode::Contains);
        assert_eq!(driver_binds(&contains), (None, Some("%driver1%".to_owned())));

        let none = DriverFilter::new(None, SearchMode::Exact);
        assert_eq!(driver_binds(&none), (None, None));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at TAXI_TEST_DATABASE_URL"]
    async fn test_driver_search_modes() {
        let _guard = DATABASE.lock().await;
        let store = empty_store().await;
        for name in ["testuser", "driver2", "driver1", "my_driver"] {
            driver(&store, name, None).await;
        }

        let exact = store
            .list_drivers(
                &DriverFilter::new(Some("driver1"), SearchMode::Exact),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(usernames(&exact), ["driver1"]);

        let partial = store
            .list_drivers(
                &DriverFilter::new(Some("driver"), SearchMode::Exact),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert!(partial.items().is_empty());

        let contains = store
            .list_drivers(
                &DriverFilter::new(Some("DRIVER"), SearchMode::Contains),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(usernames(&contains), ["driver1", "driver2", "my_driver"]);
        assert_eq!(contains.window().total(), 3);

        // `_` is matched literally, not as a wildcard.
        let underscore = store
            .list_drivers(
                &DriverFilter::new(Some("y_d"), SearchMode::Contains),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(usernames(&underscore), ["my_driver"]);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at TAXI_TEST_DATABASE_URL"]
    async fn test_drivers_ordered_bytewise() {
        let _guard = DATABASE.lock().await;
        let store = empty_store().await;
        for name in ["alice", "Zed", "bob"] {
            driver(&store, name, None).await;
        }

        let all = store
            .list_drivers(&DriverFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(usernames(&all), ["Zed", "alice", "bob"]);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at TAXI_TEST_DATABASE_URL"]
    async fn test_out_of_range_page_is_clamped() {
        let _guard = DATABASE.lock().await;
        let store = empty_store().await;
        for name in ["Audi", "BMW", "Ford", "Honda", "Toyota"] {
            manufacturer(&store, name).await;
        }

        let last = store
            .list_manufacturers(&ManufacturerFilter::default(), page(99, 2))
            .await
            .unwrap();
        assert_eq!(last.window().number(), 3);
        assert_eq!(last.window().num_pages(), 3);
        let names: Vec<_> = last.items().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Toyota"]);

        let empty = store
            .list_cars(&CarFilter::default(), page(5, 2))
            .await
            .unwrap();
        assert!(empty.items().is_empty());
        assert_eq!(empty.window().number(), 1);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at TAXI_TEST_DATABASE_URL"]
    async fn test_delete_manufacturer_cascades_to_cars() {
        let _guard = DATABASE.lock().await;
        let store = empty_store().await;
        let toyota = manufacturer(&store, "Toyota").await;
        let honda = manufacturer(&store, "Honda").await;
        let corolla = car(&store, "Corolla", &toyota).await;
        let civic = car(&store, "Civic", &honda).await;
        assert_eq!(corolla.manufacturer, toyota);

        assert!(store.delete_manufacturer(toyota.id).await.unwrap());
        assert!(!store.delete_manufacturer(toyota.id).await.unwrap());

        assert!(store.get_car(corolla.id).await.unwrap().is_none());
        assert_eq!(store.get_car(civic.id).await.unwrap(), Some(civic));
        assert_eq!(store.counts().await.unwrap().cars, 1);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at TAXI_TEST_DATABASE_URL"]
    async fn test_car_requires_existing_manufacturer() {
        let _guard = DATABASE.lock().await;
        let store = empty_store().await;
        let result = store
            .create_car(&NewCar {
                model: TextField::parse("Corolla").unwrap(),
                manufacturer_id: ManufacturerId::new(99),
            })
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL at TAXI_TEST_DATABASE_URL"]
    async fn test_driver_conflicts_name_the_field() {
        let _guard = DATABASE.lock().await;
        let store = empty_store().await;
        driver(&store, "driver1", Some("ABC12345")).await;

        let dup_username = store
            .create_driver(&new_driver("driver1", None), "hash")
            .await;
        assert!(
            matches!(dup_username, Err(RepositoryError::Conflict(ref m)) if m == "username already exists")
        );

        let dup_license = store
            .create_driver(&new_driver("driver2", Some("ABC12345")), "hash")
            .await;
        assert!(
            matches!(dup_license, Err(RepositoryError::Conflict(ref m)) if m == "license number already exists")
        );

        driver(&store, "testuser", None).await;
        driver(&store, "other", None).await;

        let (found, hash) = store
            .get_password_hash(&Username::parse("driver1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.license_number.as_ref().map(LicenseNumber::as_str), Some("ABC12345"));
        assert_eq!(hash, "hash");
    }
}
