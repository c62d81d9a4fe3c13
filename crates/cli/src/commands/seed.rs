//! Seed the database with demo data.
//!
//! Does nothing if any manufacturer, car, or driver already exists.

use secrecy::ExposeSecret;

use taxi_web::db::PgStore;
use taxi_web::seed::{SeedOutcome, seed_demo_data};

/// Environment variable holding the demo drivers' password.
const PASSWORD_VAR: &str = "TAXI_DEMO_PASSWORD";

/// Insert demo manufacturers, cars, and drivers.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the password is too weak.
pub async fn demo_data() -> Result<(), Box<dyn std::error::Error>> {
    let password = super::read_password(PASSWORD_VAR).await?;
    let store = PgStore::new(super::connect().await?);

    match seed_demo_data(&store, password.expose_secret()).await? {
        SeedOutcome::Skipped => tracing::info!("Database not empty, nothing seeded"),
        SeedOutcome::Seeded {
            manufacturers,
            cars,
            drivers,
        } => tracing::info!(manufacturers, cars, drivers, "Seeding complete"),
    }
    Ok(())
}
