//! Types kept in the browser session.

pub mod session;

pub use session::{StoredLocation, keys as session_keys};
