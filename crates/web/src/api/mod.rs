//! Vendor service client.
//!
//! Thin JSON-over-HTTP client for the Street Bite backend (`/users/*`,
//! `/vendors`). Every call is a single attempt. Status codes are mapped in
//! one place so callers only match on [`ApiError`]; a 401 tells the caller
//! to drop its bearer token.
//!
//! The public vendor listing is cached for 5 minutes.

mod types;

pub use types::{AuthResponse, LoginCredentials, UserData, VendorSummary};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use street_bite_core::{RegistrationDraft, User, UserId, Vendor, VendorId};

use types::{ErrorBody, OneOrMany};

/// Longest slice of a response body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors from the vendor service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401: the token is missing, expired or revoked.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403.
    #[error("Access forbidden")]
    Forbidden,

    /// 5xx.
    #[error("Server error ({status})")]
    Server { status: u16 },

    /// Any other non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No vendor with that id in the listing.
    #[error("Vendor not found: {0}")]
    VendorNotFound(VendorId),
}

impl ApiError {
    /// The service rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Message safe to show on a page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(message) | Self::Status { message, .. } => message.clone(),
            Self::Forbidden => "You do not have access to that.".to_string(),
            Self::VendorNotFound(_) => "That vendor could not be found.".to_string(),
            Self::Http(_) | Self::Server { .. } | Self::Parse(_) => {
                "Street Bite is having trouble right now. Please try again.".to_string()
            }
        }
    }
}

/// Cache key for vendor listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    AllVendors,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Street Bite vendor service.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, Arc<Vec<Vendor>>>,
}

impl ApiClient {
    /// Create a client for the service rooted at `base_url` (e.g. `.../api`).
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client using a preconfigured `reqwest::Client`.
    #[must_use]
    pub fn with_client(base_url: &Url, client: reqwest::Client) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create an account. Does not sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the service's message (e.g. email
    /// already taken) or a transport error.
    #[instrument(skip(self, data), fields(email = %data.email))]
    pub async fn register(&self, data: &UserData) -> Result<AuthResponse, ApiError> {
        let request = self.inner.client.post(self.url("/users/register")).json(data);
        self.send(request).await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/users/login"))
            .json(credentials);
        let response: AuthResponse = self.send(request).await?;
        if response.token.as_deref().is_none_or(str::is_empty) {
            return Err(ApiError::Parse("login response carried no token".to_string()));
        }
        Ok(response)
    }

    /// The account behind `token`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is no longer valid.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/users/me"))
            .bearer_auth(token.expose_secret());
        self.send(request).await
    }

    // =========================================================================
    // Vendors
    // =========================================================================

    /// Submit a vendor registration as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected, or the
    /// service's validation message as `ApiError::Status`.
    #[instrument(skip(self, token, draft), fields(business_name = %draft.business_name))]
    pub async fn create_vendor(
        &self,
        token: &SecretString,
        draft: &RegistrationDraft,
    ) -> Result<VendorSummary, ApiError> {
        let form = registration_form(draft)?;
        let request = self
            .inner
            .client
            .post(self.url("/vendors"))
            .bearer_auth(token.expose_secret())
            .multipart(form);
        let created = self.send(request).await?;
        self.inner.cache.invalidate(&CacheKey::AllVendors).await;
        Ok(created)
    }

    /// Registrations submitted by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn vendors_by_owner(
        &self,
        token: &SecretString,
        owner: &UserId,
    ) -> Result<Vec<VendorSummary>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("/vendors/{}", urlencoding::encode(owner.as_str()))))
            .bearer_auth(token.expose_secret());
        match self.send::<OneOrMany<VendorSummary>>(request).await {
            Ok(found) => Ok(found.into_vec()),
            Err(ApiError::Status { status: 404, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// All public vendor listings. Cached for 5 minutes.
    ///
    /// Records that do not decode or fail [`Vendor::validate`] are dropped
    /// and logged; the rest of the listing is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list_vendors(&self) -> Result<Arc<Vec<Vendor>>, ApiError> {
        if let Some(cached) = self.inner.cache.get(&CacheKey::AllVendors).await {
            debug!("Cache hit for vendor listing");
            return Ok(cached);
        }

        let request = self.inner.client.get(self.url("/vendors"));
        let raw: Vec<serde_json::Value> = self.send(request).await?;
        let total = raw.len();
        let vendors: Vec<Vendor> = raw.into_iter().filter_map(listed_vendor).collect();
        debug!(total, kept = vendors.len(), "Fetched vendor listing");

        let vendors = Arc::new(vendors);
        self.inner
            .cache
            .insert(CacheKey::AllVendors, Arc::clone(&vendors))
            .await;
        Ok(vendors)
    }

    /// One vendor from the listing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::VendorNotFound` if no listed vendor has this id.
    #[instrument(skip(self))]
    pub async fn vendor(&self, id: &VendorId) -> Result<Vendor, ApiError> {
        self.list_vendors()
            .await?
            .iter()
            .find(|v| &v.id == id)
            .cloned()
            .ok_or_else(|| ApiError::VendorNotFound(id.clone()))
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(map_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse vendor service response"
            );
            ApiError::Parse(e.to_string())
        })
    }
}

/// Map a non-success response to an error, logging the ones operators care about.
fn map_status(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .ok()
        .filter(|m| !m.trim().is_empty());

    match status {
        StatusCode::UNAUTHORIZED => {
            debug!("Vendor service rejected credentials");
            ApiError::Unauthorized(message.unwrap_or_else(|| "Invalid credentials".to_string()))
        }
        StatusCode::FORBIDDEN => {
            tracing::error!("Access forbidden");
            ApiError::Forbidden
        }
        s if s.is_server_error() => {
            tracing::error!(
                status = %s,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Server error"
            );
            ApiError::Server { status: s.as_u16() }
        }
        s => ApiError::Status {
            status: s.as_u16(),
            message: message.unwrap_or_else(|| {
                s.canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            }),
        },
    }
}

/// Decode and check one listing record. Malformed or invalid records are
/// logged and skipped.
fn listed_vendor(record: serde_json::Value) -> Option<Vendor> {
    let id = record
        .get("id")
        .or_else(|| record.get("_id"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<missing>")
        .to_string();

    let vendor = match serde_json::from_value::<Vendor>(record) {
        Ok(vendor) => vendor,
        Err(e) => {
            tracing::warn!(vendor_id = %id, error = %e, "Dropping malformed vendor record");
            return None;
        }
    };

    match vendor.validate() {
        Ok(()) => Some(vendor),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping invalid vendor record");
            None
        }
    }
}

/// Multipart body for `POST /vendors`, field names as the service expects.
fn registration_form(draft: &RegistrationDraft) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("businessName", draft.business_name.clone())
        .text("address", draft.address.clone())
        .text("city", draft.city.clone())
        .text("state", draft.state.clone())
        .text("zipCode", draft.zip_code.clone())
        .text("description", draft.description.clone());

    if let Some(image) = &draft.menu_image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| ApiError::Parse(format!("invalid menu image type: {e}")))?;
        form = form.part("menuImage", part);
    }

    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_uses_service_message() {
        let err = map_status(StatusCode::UNAUTHORIZED, r#"{"message":"Invalid email or password"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Invalid email or password");

        let err = map_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_forbidden_and_server_errors_are_generic() {
        assert!(matches!(map_status(StatusCode::FORBIDDEN, "{}"), ApiError::Forbidden));
        let err = map_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"stack trace"}"#);
        assert!(matches!(err, ApiError::Server { status: 500 }));
        assert!(!err.user_message().contains("stack trace"));
    }

    #[test]
    fn test_other_statuses_carry_message() {
        let err = map_status(StatusCode::CONFLICT, r#"{"error":"User already exists"}"#);
        assert!(matches!(err, ApiError::Status { status: 409, .. }));
        assert_eq!(err.to_string(), "User already exists");

        let err = map_status(StatusCode::BAD_REQUEST, "not json");
        assert_eq!(err.to_string(), "Bad Request");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new(&Url::parse("http://localhost:4000/api/").unwrap());
        assert_eq!(client.url("/vendors"), "http://localhost:4000/api/vendors");
    }

    #[test]
    fn test_registration_form_rejects_bad_mime() {
        let mut draft = RegistrationDraft {
            business_name: "Taco Loco".to_string(),
            menu_image: Some(street_bite_core::MenuImage {
                file_name: "menu.jpg".to_string(),
                content_type: "not a mime".to_string(),
                bytes: vec![1, 2, 3],
            }),
            ..RegistrationDraft::default()
        };
        assert!(matches!(registration_form(&draft), Err(ApiError::Parse(_))));
        draft.menu_image = None;
        assert!(registration_form(&draft).is_ok());
    }

    #[test]
    fn test_listed_vendor_skips_bad_records() {
        let good = serde_json::json!({
            "_id": "v1",
            "businessName": "Taco Loco",
            "cuisineType": "Mexican",
            "locations": [{"id": "l1", "coordinates": {"lat": 40.7, "lng": -74.0}, "address": "1 Main St"}],
            "menu": [{"id": "m1", "name": "Taco", "price": 3.5, "category": "Tacos"}]
        });
        assert_eq!(listed_vendor(good.clone()).unwrap().id.as_str(), "v1");

        let mut negative_price = good.clone();
        negative_price["menu"][0]["price"] = serde_json::json!(-1);
        assert!(listed_vendor(negative_price).is_none());

        let mut unknown_cuisine = good.clone();
        unknown_cuisine["cuisineType"] = serde_json::json!("Korean");
        assert!(listed_vendor(unknown_cuisine).is_none());

        let mut no_locations = good;
        no_locations["locations"] = serde_json::json!([]);
        assert!(listed_vendor(no_locations).is_none());
    }
}
