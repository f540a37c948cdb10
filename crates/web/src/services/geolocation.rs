//! Resolving the reference location for discovery.
//!
//! A [`GeolocationProvider`] produces one fix. [`resolve`] races it against
//! the configured timeout and folds the outcome into a
//! [`GeolocationState`] the page can render:
//!
//! - a fix: location set, no error;
//! - a provider error: no location, the error message;
//! - a timeout: the New York City fallback plus a notice;
//! - no provider: no location and an "unsupported" message.
//!
//! The browser reports its position through the `lat`/`lng` query
//! parameters (see `static/js/location.js`); the last report is kept in the
//! session for `maximum_age`. An optional IP geolocation endpoint covers
//! browsers that never report.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use street_bite_core::Coordinate;

use crate::models::StoredLocation;

/// Shown alongside the fallback location after a timeout.
pub const TIMEOUT_MESSAGE: &str = "Geolocation request timed out, using default location";

/// Shown when no way of locating the user exists.
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by your browser";

/// Errors from a single location lookup.
#[derive(Debug, Error)]
pub enum GeolocationError {
    /// The user declined to share their location.
    #[error("User denied Geolocation")]
    PermissionDenied,

    /// No fix could be obtained.
    #[error("Position unavailable")]
    PositionUnavailable,

    /// The provider answered with NaN or infinite coordinates.
    #[error("Position unavailable: invalid coordinates")]
    InvalidCoordinate,

    /// The IP geolocation endpoint failed.
    #[error("Location lookup failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Lookup options, mirrored to the browser script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// How old a remembered fix may be. Zero means always ask again.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(5000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Outcome of a lookup, ready for the page.
#[derive(Debug, Clone, PartialEq)]
pub struct GeolocationState {
    pub location: Option<Coordinate>,
    pub error: Option<String>,
    pub loading: bool,
}

impl GeolocationState {
    /// Before any lookup has finished.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            location: None,
            error: None,
            loading: true,
        }
    }

    const fn located(location: Coordinate) -> Self {
        Self {
            location: Some(location),
            error: None,
            loading: false,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            location: None,
            error: Some(error.into()),
            loading: false,
        }
    }

    /// The lookup ran past its timeout: fall back to the default location.
    #[must_use]
    pub fn timed_out() -> Self {
        Self {
            location: Some(Coordinate::DEFAULT_FALLBACK),
            error: Some(TIMEOUT_MESSAGE.to_string()),
            loading: false,
        }
    }
}

/// A source of location fixes.
pub trait GeolocationProvider: Send + Sync {
    /// Produce one fix.
    fn locate(
        &self,
        options: &GeolocationOptions,
    ) -> impl Future<Output = Result<Coordinate, GeolocationError>> + Send;
}

/// Run `provider` under `options.timeout`.
///
/// A lookup that overruns is dropped and the fallback location is used.
#[instrument(skip(provider))]
pub async fn resolve<P: GeolocationProvider>(
    provider: Option<&P>,
    options: &GeolocationOptions,
) -> GeolocationState {
    let Some(provider) = provider else {
        return GeolocationState::failed(UNSUPPORTED_MESSAGE);
    };

    match tokio::time::timeout(options.timeout, provider.locate(options)).await {
        Ok(Ok(location)) if location.is_finite() => GeolocationState::located(location),
        Ok(Ok(_)) => GeolocationState::failed(GeolocationError::InvalidCoordinate.to_string()),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Location lookup failed");
            GeolocationState::failed(e.to_string())
        }
        Err(_) => {
            tracing::warn!(timeout_ms = options.timeout.as_millis(), "Location lookup timed out");
            GeolocationState::timed_out()
        }
    }
}

// =============================================================================
// Providers
// =============================================================================

/// A failure the page reported instead of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowserFailure {
    Denied,
    Unavailable,
}

/// Position reported by the browser, or remembered from an earlier report.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocation {
    reported: Option<Coordinate>,
    remembered: Option<StoredLocation>,
    failure: Option<BrowserFailure>,
}

impl BrowserLocation {
    #[must_use]
    pub const fn new(reported: Option<Coordinate>, remembered: Option<StoredLocation>) -> Self {
        Self {
            reported,
            remembered,
            failure: None,
        }
    }

    /// The page reported that the user refused to share a position.
    #[must_use]
    pub const fn denied() -> Self {
        Self::failed(BrowserFailure::Denied)
    }

    /// The page asked but the browser could not produce a fix.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self::failed(BrowserFailure::Unavailable)
    }

    const fn failed(failure: BrowserFailure) -> Self {
        Self {
            reported: None,
            remembered: None,
            failure: Some(failure),
        }
    }

    /// Whether this request carries anything usable under `options`.
    #[must_use]
    pub fn has_fix(&self, options: &GeolocationOptions) -> bool {
        self.failure.is_some() || self.reported.is_some() || self.fresh_remembered(options).is_some()
    }

    fn fresh_remembered(&self, options: &GeolocationOptions) -> Option<Coordinate> {
        self.remembered
            .filter(|stored| stored.is_fresh(options.maximum_age, Utc::now()))
            .map(|stored| stored.coordinate)
    }
}

impl GeolocationProvider for BrowserLocation {
    async fn locate(&self, options: &GeolocationOptions) -> Result<Coordinate, GeolocationError> {
        match self.failure {
            Some(BrowserFailure::Denied) => return Err(GeolocationError::PermissionDenied),
            Some(BrowserFailure::Unavailable) => return Err(GeolocationError::PositionUnavailable),
            None => {}
        }
        self.reported
            .or_else(|| self.fresh_remembered(options))
            .ok_or(GeolocationError::PositionUnavailable)
    }
}

/// IP geolocation over HTTP; expects `{"lat": .., "lng": ..}` or the
/// `latitude`/`longitude` spelling.
#[derive(Clone)]
pub struct HttpLocator {
    client: reqwest::Client,
    url: Url,
}

#[derive(Deserialize)]
struct IpLocation {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude", alias = "lon")]
    lng: f64,
}

impl HttpLocator {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

impl GeolocationProvider for HttpLocator {
    async fn locate(&self, _options: &GeolocationOptions) -> Result<Coordinate, GeolocationError> {
        let found: IpLocation = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Coordinate::new(found.lat, found.lng))
    }
}

/// The provider chosen for a request: the browser's report when there is
/// one, otherwise the IP locator.
#[derive(Clone)]
pub enum Locator {
    Browser(BrowserLocation),
    Http(HttpLocator),
}

impl Locator {
    /// Pick a provider, or `None` when there is no way to locate the user.
    #[must_use]
    pub fn choose(
        browser: BrowserLocation,
        http: Option<&HttpLocator>,
        options: &GeolocationOptions,
    ) -> Option<Self> {
        if browser.has_fix(options) {
            Some(Self::Browser(browser))
        } else {
            http.cloned().map(Self::Http)
        }
    }
}

impl GeolocationProvider for Locator {
    async fn locate(&self, options: &GeolocationOptions) -> Result<Coordinate, GeolocationError> {
        match self {
            Self::Browser(browser) => browser.locate(options).await,
            Self::Http(http) => http.locate(options).await,
        }
    }
}
