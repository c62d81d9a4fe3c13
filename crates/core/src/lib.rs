//! Taxi Core - Shared types library.
//!
//! This crate provides common types used across all taxi service components:
//! - `web` - The authenticated web application (manufacturers, cars, drivers)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, and license numbers
//! - [`pagination`] - Page selection and clamping for list views
//! - [`search`] - Text match modes for list filters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod search;
pub mod types;

pub use pagination::{Page, PageRequest, PageSelector, PageWindow};
pub use search::{SearchMode, SearchModeError};
pub use types::*;
