//! Authentication service.
//!
//! Password registration and login for drivers. Passwords are stored as
//! Argon2id PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use std::sync::LazyLock;

use taxi_core::Username;

use crate::db::{RepositoryError, TaxiStore};
use crate::models::{Driver, NewDriver};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash verified against when the username is unknown, so a miss costs the
/// same Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("taxi-dummy-password").ok());

/// Authentication service.
///
/// Handles driver registration and login.
pub struct AuthService<'a> {
    store: &'a dyn TaxiStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn TaxiStore) -> Self {
        Self { store }
    }

    /// Register a new driver with a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AlreadyExists` if the username or license number is taken.
    pub async fn register_driver(
        &self,
        new: &NewDriver,
        password: &str,
    ) -> Result<Driver, AuthError> {
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let driver = self
            .store
            .create_driver(new, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(message) => AuthError::AlreadyExists(message),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(driver_id = %driver.id, username = %driver.username, "Driver registered");
        Ok(driver)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong,
    /// including usernames that could never have been registered.
    pub async fn login(&self, username: &str, password: &str) -> Result<Driver, AuthError> {
        let Ok(username) = Username::parse(username.trim()) else {
            return Err(reject_unknown(password));
        };

        let Some((driver, password_hash)) = self.store.get_password_hash(&username).await? else {
            return Err(reject_unknown(password));
        };

        verify_password(password, &password_hash)?;

        Ok(driver)
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Spend a verification on the dummy hash, then reject.
fn reject_unknown(password: &str) -> AuthError {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
