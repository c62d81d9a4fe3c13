//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! taxi-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `TAXI_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Schema migrations live in `crates/web/migrations/`. The session table is
//! created by `tower-sessions-sqlx-store`.

use tower_sessions_sqlx_store::PostgresStore;

/// Run schema and session store migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running taxi migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
