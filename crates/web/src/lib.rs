//! Taxi service web application library.
//!
//! Manufacturers, cars and drivers behind a session login, served with axum
//! and askama. The binary in `main.rs` wires this library to `PostgreSQL`;
//! the integration tests drive the same router against in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;

pub use app::build_router;
pub use state::AppState;
