//! Core types for the taxi service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod license;
pub mod name;
pub mod text;
pub mod username;

pub use id::*;
pub use license::{LicenseNumber, LicenseNumberError};
pub use name::{PersonName, PersonNameError};
pub use text::{TextField, TextFieldError};
pub use username::{Username, UsernameError};
