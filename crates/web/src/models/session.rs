//! Session-related types.
//!
//! Per-browser state lives in the session store under these keys. The
//! signed-in [`User`](street_bite_core::User) carries the saved vendors, so
//! favorites are restored together with the account and cleared with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use street_bite_core::Coordinate;

/// Last location the page reported, with when it was captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub coordinate: Coordinate,
    pub captured_at: DateTime<Utc>,
}

impl StoredLocation {
    #[must_use]
    pub fn now(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            captured_at: Utc::now(),
        }
    }

    /// Whether the fix is no older than `max_age` at `now`.
    #[must_use]
    pub fn is_fresh(&self, max_age: std::time::Duration, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(max_age)
            .is_ok_and(|max_age| now.signed_duration_since(self.captured_at) <= max_age)
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in user, including saved vendors.
    pub const CURRENT_USER: &str = "current_user";

    /// Bearer token issued by the vendor service.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// Set once the vendor service has confirmed the stored token.
    pub const TOKEN_VERIFIED: &str = "token_verified";

    /// Last location reported by the browser.
    pub const LAST_LOCATION: &str = "last_location";

    /// In-progress vendor registration.
    pub const REGISTRATION_WIZARD: &str = "registration_wizard";
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_freshness() {
        let fix = StoredLocation::now(Coordinate::new(30.27, -97.74));
        let later = fix.captured_at + chrono::Duration::seconds(120);
        assert!(fix.is_fresh(Duration::from_secs(300), later));
        assert!(!fix.is_fresh(Duration::from_secs(60), later));
        assert!(!fix.is_fresh(Duration::ZERO, later));
        assert!(fix.is_fresh(Duration::ZERO, fix.captured_at));
    }
}
