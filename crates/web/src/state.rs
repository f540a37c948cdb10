//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::WebConfig;
use crate::services::geolocation::{GeolocationOptions, HttpLocator};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    api: ApiClient,
    locator: Option<HttpLocator>,
    geolocation: GeolocationOptions,
}

impl AppState {
    /// Build state from configuration.
    #[must_use]
    pub fn new(config: WebConfig) -> Self {
        let api = ApiClient::new(&config.api_url);
        Self::with_api(config, api)
    }

    /// Build state around an existing vendor service client.
    #[must_use]
    pub fn with_api(config: WebConfig, api: ApiClient) -> Self {
        let locator = config.geolocation.locator_url.clone().map(HttpLocator::new);
        let geolocation = GeolocationOptions {
            timeout: config.geolocation.timeout,
            maximum_age: config.geolocation.max_age,
            ..GeolocationOptions::default()
        };

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                locator,
                geolocation,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Vendor service client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// IP geolocation fallback, when configured.
    #[must_use]
    pub fn locator(&self) -> Option<&HttpLocator> {
        self.inner.locator.as_ref()
    }

    #[must_use]
    pub fn geolocation(&self) -> &GeolocationOptions {
        &self.inner.geolocation
    }
}
