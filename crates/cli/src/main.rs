//! Taxi service CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (taxi schema and session table)
//! taxi-cli migrate
//!
//! # Create a driver account (password from TAXI_DRIVER_PASSWORD or stdin)
//! taxi-cli driver create -u alice -l ABC12345 --first-name Alice
//!
//! # Seed an empty database with demo data
//! taxi-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `driver create` - Create driver accounts
//! - `seed` - Insert demo manufacturers, cars, and drivers

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "taxi-cli")]
#[command(author, version, about = "Taxi service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage driver accounts
    Driver {
        #[command(subcommand)]
        action: DriverAction,
    },
    /// Seed an empty database with demo data
    Seed,
}

#[derive(Subcommand)]
enum DriverAction {
    /// Create a new driver
    Create {
        /// Login name (letters, digits and @.+-_)
        #[arg(short, long)]
        username: String,

        /// License number (three uppercase letters, five digits)
        #[arg(short, long)]
        license_number: Option<String>,

        /// First name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Driver { action } => match action {
            DriverAction::Create {
                username,
                license_number,
                first_name,
                last_name,
            } => {
                commands::driver::create(
                    &username,
                    license_number.as_deref(),
                    &first_name,
                    &last_name,
                )
                .await?;
            }
        },
        Commands::Seed => commands::seed::demo_data().await?,
    }
    Ok(())
}
