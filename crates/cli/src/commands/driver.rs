//! Driver account management.

use secrecy::ExposeSecret;

use taxi_core::{LicenseNumber, PersonName, Username};
use taxi_web::db::PgStore;
use taxi_web::models::NewDriver;
use taxi_web::services::auth::AuthService;

/// Environment variable holding the new driver's password.
const PASSWORD_VAR: &str = "TAXI_DRIVER_PASSWORD";

/// Create a driver account.
///
/// # Errors
///
/// Returns an error if an argument is invalid, the password is too weak, the
/// username or license number is taken, or the database is unreachable.
pub async fn create(
    username: &str,
    license_number: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let new = new_driver(username, license_number, first_name, last_name)?;
    let password = super::read_password(PASSWORD_VAR).await?;

    let store = PgStore::new(super::connect().await?);
    let driver = AuthService::new(&store)
        .register_driver(&new, password.expose_secret())
        .await?;

    tracing::info!(driver_id = %driver.id, username = %driver.username, "Driver created");
    Ok(())
}

fn new_driver(
    username: &str,
    license_number: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> Result<NewDriver, Box<dyn std::error::Error>> {
    Ok(NewDriver {
        username: Username::parse(username)?,
        first_name: PersonName::parse(first_name)
            .map_err(|e| format!("first name {e}"))?
            .into_inner(),
        last_name: PersonName::parse(last_name)
            .map_err(|e| format!("last name {e}"))?
            .into_inner(),
        license_number: license_number.map(LicenseNumber::parse).transpose()?,
    })
}
