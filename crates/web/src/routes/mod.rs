//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (featured vendors)
//! GET  /discover                  - Vendor search, filters and map
//! GET  /vendor/{id}               - Vendor detail (?category= filters the menu)
//!
//! # Favorites
//! POST /favorites/{id}/toggle     - Save or unsave a vendor, then redirect back
//!
//! # Vendor registration (requires auth)
//! GET  /vendor-register           - Current wizard step
//! POST /vendor-register/next      - Save step fields (multipart) and advance
//! POST /vendor-register/previous  - Go back one step, or leave the wizard
//! POST /vendor-register/submit    - Send the draft to the vendor service
//!
//! # Account (requires auth)
//! GET  /profile                   - Saved vendors
//! GET  /dashboard/{id}            - Carts registered by this user
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Sign-up page
//! POST /auth/register             - Sign-up action
//! POST /auth/logout               - Logout action
//! ```

pub mod auth;
pub mod dashboard;
pub mod discover;
pub mod favorites;
pub mod home;
pub mod profile;
pub mod register;
pub mod vendor;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use street_bite_core::{Favorites, User, Vendor};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Largest accepted registration upload (menu photo plus fields).
const REGISTRATION_BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the vendor registration wizard router.
pub fn register_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(register::show))
        .route("/next", post(register::next))
        .route("/previous", post(register::previous))
        .route("/submit", post(register::submit))
        .layer(DefaultBodyLimit::max(REGISTRATION_BODY_LIMIT))
        .layer(form_rate_limiter())
}

/// Create the favorites router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/toggle", post(favorites::toggle))
        .layer(form_rate_limiter())
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/discover", get(discover::discover))
        .route("/vendor/{id}", get(vendor::show))
        .route("/profile", get(profile::profile))
        .route("/dashboard/{id}", get(dashboard::dashboard))
        .nest("/vendor-register", register_routes())
        .nest("/favorites", favorite_routes())
        .nest("/auth", auth_routes())
}

// =============================================================================
// Shared view types
// =============================================================================

/// Header navigation state, present on every page.
#[derive(Clone, Default)]
pub struct NavView {
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    pub is_vendor: bool,
}

impl NavView {
    #[must_use]
    pub fn new(user: Option<&User>) -> Self {
        user.map_or_else(Self::default, |user| Self {
            user_name: Some(user.first_name().to_string()),
            user_id: Some(user.id.to_string()),
            is_vendor: user.role == street_bite_core::Role::Vendor,
        })
    }
}

/// Vendor card for lists (home, discover, profile).
#[derive(Clone)]
pub struct VendorCard {
    pub id: String,
    pub business_name: String,
    pub cuisine: String,
    pub description: String,
    pub image: Option<String>,
    pub rating: String,
    pub rating_value: f64,
    pub review_count: u32,
    pub is_open: bool,
    pub address: Option<String>,
    pub distance: Option<String>,
    pub is_favorite: bool,
}

impl VendorCard {
    #[must_use]
    pub fn new(vendor: &Vendor, distance: Option<f64>, favorites: &Favorites) -> Self {
        Self {
            id: vendor.id.to_string(),
            business_name: vendor.business_name.clone(),
            cuisine: vendor.cuisine_type.to_string(),
            description: vendor.description.clone(),
            image: vendor.images.first().cloned(),
            rating: format!("{:.1}", vendor.ratings.average),
            rating_value: vendor.ratings.average,
            review_count: vendor.ratings.count,
            is_open: vendor.is_open,
            address: vendor.primary_location().map(|l| l.address.clone()),
            distance: distance.filter(|d| d.is_finite()).map(|d| format!("{d:.1} mi")),
            is_favorite: favorites.contains(&vendor.id),
        }
    }
}

/// A redirect target from a form, limited to local paths.
pub(crate) fn local_path(candidate: Option<&str>) -> Option<&str> {
    candidate.filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}

/// `path?key=value` with the value percent-encoded.
pub(crate) fn with_message(path: &str, key: &str, message: &str) -> String {
    format!("{path}?{key}={}", urlencoding::encode(message))
}
