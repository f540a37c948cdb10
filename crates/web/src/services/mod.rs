//! Services sitting between route handlers and the vendor service.
//!
//! - `auth` - Session-backed sign in, sign up, sign out and token refresh
//! - `favorites` - Saved vendors of the signed-in user
//! - `geolocation` - Resolving the reference location for discovery

pub mod auth;
pub mod favorites;
pub mod geolocation;
