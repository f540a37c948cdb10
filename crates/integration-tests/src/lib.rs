//! Integration tests for Street Bite.
//!
//! The web front end is exercised against an in-process mock of the vendor
//! service, so no external backend is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p street-bite-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `vendor_service` - the vendor service client
//! - `auth_flow` - sign-in state kept in the session
//! - `web_app` - full router requests

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_sessions::{MemoryStore, Session};
use url::Url;

use street_bite_web::config::{GeolocationConfig, WebConfig};

/// Serve `routes` under `/api` on an ephemeral port and return the base URL.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn_backend(routes: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock vendor service");
    let addr = listener
        .local_addr()
        .expect("Mock vendor service has no address");

    let app = Router::new().nest("/api", routes);
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Mock vendor service stopped");
    });

    Url::parse(&format!("http://{addr}/api")).expect("Invalid mock vendor service URL")
}

/// Configuration pointing at a mock vendor service.
#[must_use]
pub fn test_config(api_url: Url) -> WebConfig {
    WebConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        api_url,
        session_secret: SecretString::from("kq8ZrT2vW5nB7xLm4pHs9dFj3cYg6uAe"),
        geolocation: GeolocationConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A fresh in-memory session.
#[must_use]
pub fn session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// A user record as the vendor service returns it.
#[must_use]
pub fn user_json(id: &str, name: &str, email: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": email,
        "role": "user",
        "savedVendors": []
    })
}

/// A valid vendor listing at the given position.
#[must_use]
pub fn vendor_json(id: &str, business_name: &str, lat: f64, lng: f64) -> Value {
    json!({
        "id": id,
        "businessName": business_name,
        "description": format!("{business_name} serves the lunch crowd"),
        "cuisineType": "Mexican",
        "locations": [{
            "id": format!("{id}-loc"),
            "coordinates": {"lat": lat, "lng": lng},
            "address": "123 Main St"
        }],
        "menu": [{
            "id": format!("{id}-m1"),
            "name": "Carne Asada Taco",
            "price": 3.5,
            "category": "Tacos"
        }],
        "ratings": {"average": 4.5, "count": 12},
        "isOpen": true
    })
}
