//! Core value types for Street Bite.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use user::{Role, User};
