//! CLI subcommands and shared helpers.

pub mod driver;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Connect to the database named by `TAXI_DATABASE_URL` (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("TAXI_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "TAXI_DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    Ok(taxi_web::db::create_pool(&database_url).await?)
}

/// Read a password from `env_var`, falling back to the first line of stdin.
pub async fn read_password(env_var: &str) -> Result<SecretString, Box<dyn std::error::Error>> {
    if let Ok(password) = std::env::var(env_var) {
        return Ok(SecretString::from(password));
    }

    tracing::info!("{env_var} not set, reading password from stdin");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err("no password given".into());
    }
    Ok(SecretString::from(password.to_owned()))
}
