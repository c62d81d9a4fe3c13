//! Taxi service web server.
//!
//! Serves the manufacturer, car, and driver pages on port 8000.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - `PostgreSQL` via sqlx, or an in-memory store for demos
//! - Session login backed by tower-sessions
//!
//! # Stores
//!
//! With `TAXI_STORE=postgres` (the default) entities and sessions live in
//! `PostgreSQL`. Migrations are NOT run on startup:
//!
//! ```bash
//! cargo run -p taxi-cli -- migrate
//! ```
//!
//! With `TAXI_STORE=memory` everything is kept in process and lost on exit.

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taxi_web::config::{StoreBackend, WebConfig};
use taxi_web::db::{self, InMemoryStore, PgStore};
use taxi_web::middleware::create_session_layer;
use taxi_web::seed::{SeedOutcome, seed_demo_data};
use taxi_web::{AppState, build_router};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &WebConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = WebConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taxi_web=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let app = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");

            let session_store = tower_sessions_sqlx_store::PostgresStore::new(pool.clone());
            let session_layer = create_session_layer(session_store, &config);
            build_router(AppState::new(config.clone(), PgStore::new(pool)), session_layer)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");

            let store = InMemoryStore::new();
            if let Some(password) = &config.demo_password {
                match seed_demo_data(&store, password.expose_secret()).await {
                    Ok(SeedOutcome::Seeded { drivers, .. }) => {
                        tracing::info!(drivers, "Demo drivers can log in with TAXI_DEMO_PASSWORD");
                    }
                    Ok(SeedOutcome::Skipped) => {}
                    Err(e) => tracing::error!(error = %e, "Failed to seed demo data"),
                }
            }

            let session_layer =
                create_session_layer(tower_sessions::MemoryStore::default(), &config);
            build_router(AppState::new(config.clone(), store), session_layer)
        }
    };

    // Sentry layers (outermost for full request coverage)
    let app = app
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("taxi-web listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
